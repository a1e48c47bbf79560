// src/import.rs
// Bulk-load drains from a JSON array of {name, lat, lng}

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::geo::Coordinate;
use crate::things::{NewThing, ThingRepository};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Insert every record with a valid coordinate; invalid ones are skipped and logged.
pub async fn import_things(things: &dyn ThingRepository, records: Vec<NewThing>) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for record in records {
        if let Err(reason) = Coordinate::new(record.lat, record.lng) {
            warn!("Skipping {:?}: {}", record.name, reason);
            summary.skipped += 1;
            continue;
        }
        things
            .insert(record)
            .await
            .context("Failed to insert drain")?;
        summary.imported += 1;
    }

    info!("Imported {} drains ({} skipped)", summary.imported, summary.skipped);
    Ok(summary)
}

pub async fn import_file(things: &dyn ThingRepository, path: &Path) -> Result<ImportSummary> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<NewThing> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    import_things(things, records).await
}
