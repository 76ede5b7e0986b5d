use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use weekgrid_core::reconcile::{RawEventRecord, ReconciliationService};
use weekgrid_core::store::KeyValueStore;

pub async fn run<S: KeyValueStore>(service: &ReconciliationService<S>, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Could not read batch file {}", file.display()))?;
    let batch: Vec<RawEventRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Could not parse batch file {}", file.display()))?;

    let received = batch.len();
    let merged = service.sync(batch).await?;

    println!(
        "{}",
        format!(
            "  Ingested {received} record(s); collection now holds {} event(s)",
            merged.len()
        )
        .green()
    );

    Ok(())
}
