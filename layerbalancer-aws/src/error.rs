//! AWS integration error types.

use thiserror::Error;

/// Result type for AWS setup operations.
pub type AwsResult<T> = Result<T, AwsError>;

/// Errors that can occur while wiring the AWS collaborators.
#[derive(Debug, Error)]
pub enum AwsError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no AWS credentials available: {0}")]
    MissingCredentials(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Layer(#[from] layerbalancer_core::LayerError),
}
