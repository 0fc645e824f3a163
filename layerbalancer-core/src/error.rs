//! Error types for the reconciliation engine.

use thiserror::Error;

/// Result type for layer operations.
pub type LayerResult<T> = Result<T, LayerError>;

/// Errors that can occur while querying, reconciling or verifying a layer.
#[derive(Debug, Error)]
pub enum LayerError {
    /// Invalid invocation (missing layer name, too few regions).
    #[error("{0}")]
    Usage(String),

    /// A specific version could not be retrieved.
    #[error("unable to retrieve layer version: {0}")]
    Fetch(String),

    /// The version does not exist in the region.
    #[error("unable to retrieve layer version: version {number} not found in region {region}")]
    NotFound { region: String, number: i64 },

    /// Listing the versions of a region failed.
    #[error("unable to list layer versions: {0}")]
    List(String),

    /// Publishing a version failed.
    #[error("failed to publish layer version: {0}")]
    Publish(String),

    /// The payload request could not be sent.
    #[error("failed to retrieve the layer content: {0}")]
    Request(String),

    /// The payload body could not be read.
    #[error("failed to download the layer version: {0}")]
    Download(String),

    /// A version handed to publish carried no payload bytes.
    #[error("version must carry payload bytes to be published")]
    MissingPayload,

    /// A version handed to download carried no remote location.
    #[error("version {0} has no content location")]
    MissingLocation(i64),

    /// One region of a fan-out failed; wraps the first failure.
    #[error("one of regions failed to retrieve the version: {0}")]
    RegionFailed(Box<LayerError>),

    /// No region has ever published the layer.
    #[error("there are no published versions")]
    NoPublishedVersions,

    /// Regions report different latest versions.
    #[error("some regions are not bumped")]
    NotBumped,

    /// The gateway assigned a number other than the source number.
    #[error("region {region} assigned version {assigned}, expected {expected}")]
    NumberingMismatch {
        region: String,
        expected: i64,
        assigned: i64,
    },

    /// The operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// A region task panicked or was aborted.
    #[error("region task failed: {0}")]
    Task(String),
}

impl LayerError {
    /// Returns true for the expected outcomes of a check rather than defects.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LayerError::NoPublishedVersions | LayerError::NotBumped)
    }

    /// Returns true if the error is a missing version, at any wrapping depth.
    pub fn is_not_found(&self) -> bool {
        match self {
            LayerError::NotFound { .. } => true,
            LayerError::RegionFailed(inner) => inner.is_not_found(),
            _ => false,
        }
    }

    /// Returns true if the error stems from cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            LayerError::Cancelled => true,
            LayerError::RegionFailed(inner) => inner.is_cancelled(),
            _ => false,
        }
    }
}
