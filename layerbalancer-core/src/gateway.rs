//! Remote collaborator interfaces.
//!
//! The engine only talks to the hosting service through these two traits, so
//! any backend (AWS Lambda, an in-memory fake) can be plugged in.

use crate::error::LayerResult;
use crate::version::Version;
use async_trait::async_trait;

/// Access to the versions of a layer, region by region.
#[async_trait]
pub trait LayerGateway: Send + Sync {
    /// Returns the name of the hosting provider.
    fn provider_name(&self) -> &'static str;

    /// Retrieves version `number` of `layer` in `region`, with its content
    /// location populated.
    ///
    /// Fails with [`LayerError::NotFound`](crate::LayerError::NotFound) when
    /// the version does not exist.
    async fn fetch_version(&self, layer: &str, number: i64, region: &str)
    -> LayerResult<Version>;

    /// Returns the most recent version of `layer` in `region`, or `None` when
    /// the layer was never published there.
    async fn latest_version(&self, layer: &str, region: &str) -> LayerResult<Option<Version>>;

    /// Publishes `version` (carrying payload bytes) into `version.region` and
    /// returns the number the service assigned to it.
    async fn publish_version(&self, layer: &str, version: &Version) -> LayerResult<i64>;
}

/// Downloads version payloads from their content location.
#[async_trait]
pub trait PayloadTransfer: Send + Sync {
    /// Reads the whole payload stored at `location` into memory.
    async fn download(&self, location: &str) -> LayerResult<Vec<u8>>;
}
