//! Single-region operations on a named layer.

use crate::error::{LayerError, LayerResult};
use crate::gateway::{LayerGateway, PayloadTransfer};
use crate::version::{Content, Version};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A named layer bound to a gateway and a payload transfer.
///
/// Cheap to clone; clones share the same collaborators.
#[derive(Clone)]
pub struct Layer {
    name: Arc<str>,
    gateway: Arc<dyn LayerGateway>,
    transfer: Arc<dyn PayloadTransfer>,
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("name", &self.name)
            .field("provider", &self.gateway.provider_name())
            .finish()
    }
}

impl Layer {
    /// Binds `name` to the given collaborators.
    pub fn new(
        name: impl Into<String>,
        gateway: Arc<dyn LayerGateway>,
        transfer: Arc<dyn PayloadTransfer>,
    ) -> LayerResult<Self> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(LayerError::Usage(
                r#"required argument "layer-name" not set"#.to_string(),
            ));
        }

        Ok(Self {
            name: Arc::from(name),
            gateway,
            transfer,
        })
    }

    /// Returns the layer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Retrieves a specific version of the layer from `region`.
    pub async fn fetch_version(&self, number: i64, region: &str) -> LayerResult<Version> {
        debug!("Fetching {} version {} from {}", self.name, number, region);
        self.gateway.fetch_version(&self.name, number, region).await
    }

    /// Retrieves the latest version of the layer in `region`.
    ///
    /// A region without any published version yields [`Version::absent`].
    pub async fn latest_version(&self, region: &str) -> LayerResult<Version> {
        let latest = self.gateway.latest_version(&self.name, region).await?;
        let version = latest.unwrap_or_else(|| Version::absent(region));
        debug!("Latest {} version in {}: {}", self.name, region, version.number);
        Ok(version)
    }

    /// Downloads the payload of `version` from its content location.
    pub async fn download_version(&self, version: &Version) -> LayerResult<Vec<u8>> {
        let location = version
            .content
            .location()
            .ok_or(LayerError::MissingLocation(version.number))?;

        let payload = self.transfer.download(location).await?;
        debug!(
            "Downloaded {} version {} ({} bytes)",
            self.name,
            version.number,
            payload.len()
        );
        Ok(payload)
    }

    /// Publishes `version` into its region and returns the assigned number.
    pub async fn publish_version(&self, version: &Version) -> LayerResult<i64> {
        if !matches!(version.content, Content::Bytes(_)) {
            return Err(LayerError::MissingPayload);
        }

        let assigned = self.gateway.publish_version(&self.name, version).await?;
        debug!(
            "Published {} into {} as version {}",
            self.name, version.region, assigned
        );
        Ok(assigned)
    }
}
