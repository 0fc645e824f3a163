//! Bringing every region up to the greatest version.
//!
//! For each region the driver walks the gap between the region's latest
//! version and the greatest one, one version at a time:
//!
//! 1. fetch version `i + 1` from the region holding the greatest version
//! 2. download its payload
//! 3. republish it into the lagging region
//!
//! Regions are processed concurrently; versions within a region strictly in
//! order. Re-running after a partial failure only replays what is missing.

use crate::error::{LayerError, LayerResult};
use crate::fanout::fan_out;
use crate::layer::Layer;
use crate::version::{RegionSet, Version};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Configuration for the reconciliation driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Fail a region when the number assigned on publish differs from the
    /// source version number. Only logged when false.
    #[serde(default)]
    pub strict_numbering: bool,
}

/// Progress notifications emitted while reconciling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// A region task started.
    Started { region: String },
    /// Downloading the payload of `number` from the source region.
    Downloading { region: String, number: i64 },
    /// Publishing `number` into the region.
    Publishing { region: String, number: i64 },
    /// The gateway accepted the publish and assigned `assigned`.
    Published {
        region: String,
        number: i64,
        assigned: i64,
    },
    /// The region is at the greatest version.
    Completed { region: String, published: usize },
}

/// What the driver did for one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionReport {
    pub region: String,
    /// Latest version before reconciling.
    pub from: i64,
    /// Version the region was brought to.
    pub to: i64,
    /// Numbers assigned to the versions published into the region, in order.
    pub published: Vec<i64>,
}

impl RegionReport {
    /// Returns true if the region was already current.
    pub fn was_current(&self) -> bool {
        self.published.is_empty()
    }
}

/// Outcome of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// The version every region was brought to.
    pub greatest: Version,
    /// One entry per region, in region order.
    pub regions: Vec<RegionReport>,
}

impl ReconcileReport {
    /// Number of regions that needed at least one publish.
    pub fn bumped(&self) -> usize {
        self.regions.iter().filter(|r| !r.was_current()).count()
    }

    /// Total number of publishes across regions.
    pub fn published(&self) -> usize {
        self.regions.iter().map(|r| r.published.len()).sum()
    }
}

/// Drives the catch-up of every region of a layer.
pub struct Reconciler {
    layer: Layer,
    config: ReconcileConfig,
    events: Option<UnboundedSender<ReconcileEvent>>,
}

impl Reconciler {
    /// Creates a driver with the default configuration.
    pub fn new(layer: Layer) -> Self {
        Self::with_config(layer, ReconcileConfig::default())
    }

    /// Creates a driver with a custom configuration.
    pub fn with_config(layer: Layer, config: ReconcileConfig) -> Self {
        Self {
            layer,
            config,
            events: None,
        }
    }

    /// Sends progress events to `events`.
    pub fn with_events(mut self, events: UnboundedSender<ReconcileEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Resolves the greatest version across `regions` and brings every region
    /// up to it.
    pub async fn run(
        &self,
        regions: &RegionSet,
        cancel: &CancellationToken,
    ) -> LayerResult<ReconcileReport> {
        let greatest = self.layer.greatest_version(regions, cancel).await?;
        self.reconcile_to(regions, greatest, cancel).await
    }

    /// Brings every region of `regions` up to `greatest`.
    ///
    /// Fails with [`LayerError::NoPublishedVersions`] without touching any
    /// region when `greatest` is not a published version.
    pub async fn reconcile_to(
        &self,
        regions: &RegionSet,
        greatest: Version,
        cancel: &CancellationToken,
    ) -> LayerResult<ReconcileReport> {
        if !greatest.is_published() {
            return Err(LayerError::NoPublishedVersions);
        }

        let reports = fan_out(regions, cancel, |region, token| {
            let task = RegionTask {
                layer: self.layer.clone(),
                region,
                source: greatest.region.clone(),
                target: greatest.number,
                strict_numbering: self.config.strict_numbering,
                events: self.events.clone(),
                cancel: token,
            };
            task.run()
        })
        .await?;

        info!(
            "Reconciled {} across {} regions at version {}",
            self.layer.name(),
            reports.len(),
            greatest.number
        );

        Ok(ReconcileReport {
            greatest,
            regions: reports,
        })
    }
}

/// Catch-up of a single region.
struct RegionTask {
    layer: Layer,
    region: String,
    source: String,
    target: i64,
    strict_numbering: bool,
    events: Option<UnboundedSender<ReconcileEvent>>,
    cancel: CancellationToken,
}

impl RegionTask {
    async fn run(self) -> LayerResult<RegionReport> {
        self.emit(ReconcileEvent::Started {
            region: self.region.clone(),
        });

        let latest = self.layer.latest_version(&self.region).await?;
        let mut published = Vec::new();

        for number in latest.number + 1..=self.target {
            if self.cancel.is_cancelled() {
                return Err(LayerError::Cancelled);
            }
            published.push(self.replicate(number).await?);
        }

        if published.is_empty() {
            info!("{}: already at version {}", self.region, latest.number);
        } else {
            info!(
                "{}: bumped from version {} to {}",
                self.region, latest.number, self.target
            );
        }

        self.emit(ReconcileEvent::Completed {
            region: self.region.clone(),
            published: published.len(),
        });

        Ok(RegionReport {
            region: self.region,
            from: latest.number,
            to: latest.number.max(self.target),
            published,
        })
    }

    /// Copies version `number` from the source region into this region.
    async fn replicate(&self, number: i64) -> LayerResult<i64> {
        let current = self.layer.fetch_version(number, &self.source).await?;

        self.emit(ReconcileEvent::Downloading {
            region: self.region.clone(),
            number,
        });
        let payload = self.layer.download_version(&current).await?;

        let version = current.republish_to(self.region.as_str(), payload);

        self.emit(ReconcileEvent::Publishing {
            region: self.region.clone(),
            number,
        });
        let assigned = self.layer.publish_version(&version).await?;

        if assigned != number {
            if self.strict_numbering {
                return Err(LayerError::NumberingMismatch {
                    region: self.region.clone(),
                    expected: number,
                    assigned,
                });
            }
            warn!(
                "{}: published version {} as {}, region numbering diverges from {}",
                self.region, number, assigned, self.source
            );
        }

        self.emit(ReconcileEvent::Published {
            region: self.region.clone(),
            number,
            assigned,
        });
        Ok(assigned)
    }

    fn emit(&self, event: ReconcileEvent) {
        if let Some(events) = &self.events {
            // A closed receiver only means nobody renders progress.
            let _ = events.send(event);
        }
    }
}
