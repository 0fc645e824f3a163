//! Cross-region version reconciliation for Lambda layers.
//!
//! A layer is published independently in each region, so regions drift apart
//! whenever a new version lands in only one of them. This crate computes the
//! greatest version across a set of regions and replays the missing versions
//! into every lagging region.
//!
//! # Components
//!
//! - **Version**: one version of a layer as seen in one region
//! - **Gateway**: the remote service, behind [`LayerGateway`] and [`PayloadTransfer`]
//! - **Query**: latest version per region, and the greatest across regions
//! - **Reconcile**: per-region catch-up driven by [`Reconciler`]
//! - **Verify**: checks that every region serves the same latest version
//!
//! All multi-region operations run one task per region, return results in
//! region order, and cancel the remaining regions on the first failure.

mod error;
mod fanout;
mod gateway;
mod layer;
mod query;
mod reconcile;
mod verify;
mod version;

pub use error::{LayerError, LayerResult};
pub use gateway::{LayerGateway, PayloadTransfer};
pub use layer::Layer;
pub use query::greatest_of;
pub use reconcile::{ReconcileConfig, ReconcileEvent, ReconcileReport, Reconciler, RegionReport};
pub use verify::{compact_by_number, Verification};
pub use version::{Content, RegionSet, Version};

pub use tokio_util::sync::CancellationToken;
