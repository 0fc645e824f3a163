//! Terminal rendering of reconciliation progress.

use layerbalancer_core::ReconcileEvent;
use std::io::{self, Write};
use tokio::sync::mpsc::UnboundedReceiver;

/// Formats an event as a progress line, or `None` for events that stay silent.
pub fn describe(event: &ReconcileEvent) -> Option<String> {
    match event {
        ReconcileEvent::Started { region } => Some(format!("{region}: starting...")),
        ReconcileEvent::Downloading { region, number } => {
            Some(format!("{region}: downloading version {number}"))
        }
        ReconcileEvent::Publishing { region, number } => {
            Some(format!("{region}: publishing version {number}"))
        }
        ReconcileEvent::Published {
            region,
            number,
            assigned,
        } if number != assigned => Some(format!(
            "{region}: version {number} was published as {assigned}"
        )),
        ReconcileEvent::Published { .. } => None,
        ReconcileEvent::Completed { region, .. } => Some(format!("{region}: bump complete")),
    }
}

/// Writes one line per event until every sender is dropped.
pub async fn render<W: Write>(
    mut events: UnboundedReceiver<ReconcileEvent>,
    out: &mut W,
) -> io::Result<()> {
    while let Some(event) = events.recv().await {
        if let Some(line) = describe(&event) {
            writeln!(out, "{line}")?;
        }
    }
    out.flush()
}
