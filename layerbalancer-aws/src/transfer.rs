//! HTTP download of layer payloads.
//!
//! Lambda hands out pre-signed URLs as content locations; the payload is
//! fetched with a plain GET.

use crate::config::AwsSettings;
use crate::error::AwsResult;
use async_trait::async_trait;
use layerbalancer_core::{LayerError, LayerResult, PayloadTransfer};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Downloads payloads over HTTP(S) into memory.
#[derive(Debug, Clone)]
pub struct HttpTransfer {
    client: Client,
    max_payload_bytes: u64,
}

impl HttpTransfer {
    /// Creates a transfer honouring the download timeout and size limit.
    pub fn new(settings: &AwsSettings) -> AwsResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.download_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            max_payload_bytes: settings.max_payload_bytes,
        })
    }

    fn too_large(&self, size: u64) -> LayerError {
        LayerError::Download(format!(
            "payload of {size} bytes exceeds the {} bytes limit",
            self.max_payload_bytes
        ))
    }
}

/// Pre-signed locations carry credentials in the query string.
fn redact(location: &str) -> &str {
    location.split('?').next().unwrap_or(location)
}

#[async_trait]
impl PayloadTransfer for HttpTransfer {
    async fn download(&self, location: &str) -> LayerResult<Vec<u8>> {
        debug!("Downloading layer content from {}", redact(location));

        let mut response = self
            .client
            .get(location)
            .send()
            .await
            .map_err(|e| LayerError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LayerError::Download(format!("unexpected status {status}")));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_payload_bytes {
                return Err(self.too_large(length));
            }
        }

        let capacity = response
            .content_length()
            .unwrap_or(0)
            .min(self.max_payload_bytes);
        let mut payload = Vec::with_capacity(capacity as usize);

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| LayerError::Download(e.without_url().to_string()))?
        {
            let size = (payload.len() + chunk.len()) as u64;
            if size > self.max_payload_bytes {
                return Err(self.too_large(size));
            }
            payload.extend_from_slice(&chunk);
        }

        debug!("Downloaded {} bytes", payload.len());
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_strips_signature() {
        assert_eq!(
            redact("https://bucket.s3.amazonaws.com/layer.zip?X-Amz-Signature=abc"),
            "https://bucket.s3.amazonaws.com/layer.zip"
        );
        assert_eq!(redact("https://example.com/a.zip"), "https://example.com/a.zip");
    }
}
