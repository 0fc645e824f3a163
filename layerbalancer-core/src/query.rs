//! Latest and greatest versions across regions.

use crate::error::{LayerError, LayerResult};
use crate::fanout::fan_out;
use crate::layer::Layer;
use crate::version::{RegionSet, Version};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Picks the version with the highest number.
///
/// Comparison is strict, so on ties the first one in `versions` wins.
pub fn greatest_of(versions: &[Version]) -> Option<&Version> {
    let mut iter = versions.iter();
    let first = iter.next()?;
    Some(iter.fold(first, |greatest, v| {
        if v.number > greatest.number { v } else { greatest }
    }))
}

impl Layer {
    /// Retrieves the latest version of every region concurrently.
    ///
    /// `result[i]` belongs to the i-th region of `regions`. The first region
    /// failure cancels the others and is returned wrapped.
    pub async fn latest_versions(
        &self,
        regions: &RegionSet,
        cancel: &CancellationToken,
    ) -> LayerResult<Vec<Version>> {
        fan_out(regions, cancel, |region, _| {
            let layer = self.clone();
            async move { layer.latest_version(&region).await }
        })
        .await
        .map_err(|e| LayerError::RegionFailed(Box::new(e)))
    }

    /// Retrieves the greatest version of the layer across `regions`.
    ///
    /// Returns a version numbered 0 when no region has published the layer;
    /// callers decide whether that is terminal.
    pub async fn greatest_version(
        &self,
        regions: &RegionSet,
        cancel: &CancellationToken,
    ) -> LayerResult<Version> {
        let versions = self.latest_versions(regions, cancel).await?;
        let greatest = greatest_of(&versions)
            .cloned()
            .ok_or(LayerError::NoPublishedVersions)?;

        info!(
            "Greatest {} version {} in region {}",
            self.name(),
            greatest.number,
            greatest.region
        );
        Ok(greatest)
    }
}
