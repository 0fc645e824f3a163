//! Subcommand bodies, written against any [`Write`] sink.

use crate::cli::Cli;
use crate::progress;
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use layerbalancer_core::{
    CancellationToken, Layer, ReconcileConfig, ReconcileReport, Reconciler, RegionSet,
};
use std::io::Write;
use tokio::sync::mpsc;

/// Brings every region of `regions` up to the greatest published version.
pub async fn bump<W: Write>(
    layer: Layer,
    regions: &RegionSet,
    config: ReconcileConfig,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<ReconcileReport> {
    writeln!(out, "Bumping layer across regions: {regions}")?;

    let greatest = layer.greatest_version(regions, cancel).await?;
    writeln!(
        out,
        "Greatest version {} in region {}",
        greatest.number, greatest.region
    )?;

    let (tx, rx) = mpsc::unbounded_channel();
    let reconciler = Reconciler::with_config(layer, config).with_events(tx);

    // The reconciler owns the only sender, so rendering ends with the run.
    let run = async move { reconciler.reconcile_to(regions, greatest, cancel).await };
    let (report, rendered) = tokio::join!(run, progress::render(rx, &mut *out));
    let report = report?;
    rendered?;

    writeln!(
        out,
        "{} of {} regions bumped, {} versions published",
        report.bumped(),
        report.regions.len(),
        report.published()
    )?;
    Ok(report)
}

/// Checks that every region of `regions` has the same latest version.
pub async fn verify<W: Write>(
    layer: &Layer,
    regions: &RegionSet,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<i64> {
    let number = layer.verify(regions, cancel).await?.into_result()?;
    writeln!(out, "all regions bumped")?;
    Ok(number)
}

/// Writes the completion script of `lb` for `shell`.
pub fn completions<W: Write>(shell: Shell, out: &mut W) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "lb", out);
}
