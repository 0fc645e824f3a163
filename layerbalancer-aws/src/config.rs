//! Settings for the AWS collaborators.

use crate::error::{AwsError, AwsResult};
use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_types::SdkConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest zip Lambda accepts inline on publish.
pub const DEFAULT_MAX_PAYLOAD_BYTES: u64 = 50 * 1024 * 1024; // 50 MB

/// AWS settings shared by the gateway and the payload transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsSettings {
    /// Named profile from the shared config files.
    pub profile: Option<String>,
    /// Endpoint override (e.g. LocalStack).
    pub endpoint_url: Option<String>,
    /// Lambda operation timeout in milliseconds, including SDK retries.
    pub timeout_ms: Option<u64>,
    /// Lambda retries after the initial attempt.
    pub max_retries: Option<u32>,
    /// Timeout for a whole payload download, in seconds.
    pub download_timeout_secs: u64,
    /// Payloads above this size are rejected before publishing.
    pub max_payload_bytes: u64,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            profile: None,
            endpoint_url: None,
            timeout_ms: None,
            max_retries: None,
            download_timeout_secs: 300,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl AwsSettings {
    /// Checks values that would only fail later, mid-reconciliation.
    pub fn validate(&self) -> AwsResult<()> {
        if self.download_timeout_secs == 0 {
            return Err(AwsError::Config(
                "download timeout must be greater than zero".to_string(),
            ));
        }
        if self.max_payload_bytes == 0 {
            return Err(AwsError::Config(
                "max payload size must be greater than zero".to_string(),
            ));
        }
        if let Some(url) = &self.endpoint_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AwsError::Config(format!("invalid endpoint url: {url}")));
            }
        }
        Ok(())
    }
}

/// Loads the SDK configuration from the default provider chain.
///
/// The region of the loaded configuration is irrelevant: every Lambda call
/// targets the region being processed.
pub async fn load_sdk_config(settings: &AwsSettings) -> AwsResult<SdkConfig> {
    settings.validate()?;

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile) = &settings.profile {
        loader = loader.profile_name(profile);
    }
    if let Some(endpoint) = &settings.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;
    ensure_credentials(&sdk_config).await?;

    debug!(
        "Loaded AWS config (profile: {:?}, endpoint: {:?})",
        settings.profile, settings.endpoint_url
    );
    Ok(sdk_config)
}

/// Resolves credentials once so a missing chain fails before any region is
/// touched.
pub async fn ensure_credentials(sdk_config: &SdkConfig) -> AwsResult<()> {
    let provider = sdk_config.credentials_provider().ok_or_else(|| {
        AwsError::MissingCredentials("no credentials provider configured".to_string())
    })?;

    provider
        .provide_credentials()
        .await
        .map_err(|e| AwsError::MissingCredentials(DisplayErrorContext(&e).to_string()))?;
    Ok(())
}
