//! Checking whether all regions serve the same latest version.

use crate::error::{LayerError, LayerResult};
use crate::layer::Layer;
use crate::version::{RegionSet, Version};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Classification of the latest versions across regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verification {
    /// Every region serves `number`.
    Reconciled { number: i64 },
    /// No region has published the layer.
    NoPublishedVersions,
    /// Neighbouring regions disagree; holds the compacted sequence.
    Drift { versions: Vec<Version> },
}

impl Verification {
    /// Classifies per-region latest versions given in region order.
    ///
    /// Only adjacent entries are compared, so regions must be presented in a
    /// stable order.
    pub fn classify(versions: Vec<Version>) -> Self {
        let compacted = compact_by_number(versions);
        match compacted.as_slice() {
            [] => Verification::NoPublishedVersions,
            [only] if !only.is_published() => Verification::NoPublishedVersions,
            [only] => Verification::Reconciled {
                number: only.number,
            },
            _ => Verification::Drift {
                versions: compacted,
            },
        }
    }

    pub fn is_reconciled(&self) -> bool {
        matches!(self, Verification::Reconciled { .. })
    }

    /// Turns the non-reconciled outcomes into their terminal errors.
    pub fn into_result(self) -> LayerResult<i64> {
        match self {
            Verification::Reconciled { number } => Ok(number),
            Verification::NoPublishedVersions => Err(LayerError::NoPublishedVersions),
            Verification::Drift { .. } => Err(LayerError::NotBumped),
        }
    }
}

/// Collapses runs of consecutive versions sharing the same number.
pub fn compact_by_number(mut versions: Vec<Version>) -> Vec<Version> {
    versions.dedup_by_key(|v| v.number);
    versions
}

impl Layer {
    /// Fetches the latest version of every region and classifies them.
    pub async fn verify(
        &self,
        regions: &RegionSet,
        cancel: &CancellationToken,
    ) -> LayerResult<Verification> {
        let versions = self.latest_versions(regions, cancel).await?;
        let verification = Verification::classify(versions);
        info!("Verified {} across {}: {:?}", self.name(), regions, verification);
        Ok(verification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn version(region: &str, number: i64) -> Version {
        Version {
            number,
            ..Version::absent(region)
        }
    }

    #[test]
    fn compaction_is_adjacent_only() {
        let versions = vec![
            version("a", 3),
            version("b", 3),
            version("c", 5),
            version("d", 3),
        ];
        let numbers: Vec<i64> = compact_by_number(versions).iter().map(|v| v.number).collect();
        assert_eq!(numbers, vec![3, 5, 3]);
    }

    #[test]
    fn compaction_keeps_first_of_run() {
        let versions = vec![version("a", 4), version("b", 4)];
        let compacted = compact_by_number(versions);
        assert_eq!(compacted.len(), 1);
        assert_eq!(compacted[0].region, "a");
    }

    #[test]
    fn classify_reconciled() {
        let v = Verification::classify(vec![version("a", 6), version("b", 6)]);
        assert_eq!(v, Verification::Reconciled { number: 6 });
    }

    #[test]
    fn classify_no_published_versions() {
        let v = Verification::classify(vec![Version::absent("a"), Version::absent("b")]);
        assert_eq!(v, Verification::NoPublishedVersions);
        assert!(v.into_result().unwrap_err().is_terminal());
    }

    #[test]
    fn classify_drift() {
        let v = Verification::classify(vec![version("a", 6), version("b", 0)]);
        assert!(matches!(v, Verification::Drift { ref versions } if versions.len() == 2));
        assert!(matches!(v.into_result(), Err(LayerError::NotBumped)));
    }

    proptest! {
        #[test]
        fn compacted_has_no_equal_neighbours(numbers in prop::collection::vec(0i64..4, 0..16)) {
            let versions: Vec<Version> = numbers.iter().map(|n| version("r", *n)).collect();
            let compacted = compact_by_number(versions);
            for pair in compacted.windows(2) {
                prop_assert_ne!(pair[0].number, pair[1].number);
            }
        }

        #[test]
        fn uniform_input_is_reconciled(number in 1i64..1000, count in 2usize..8) {
            let versions: Vec<Version> = (0..count).map(|i| version(&format!("r{i}"), number)).collect();
            prop_assert_eq!(Verification::classify(versions), Verification::Reconciled { number });
        }
    }
}
