//! One-shot refresh command implementation.

use anyhow::{bail, Result};
use marine_refresh::CycleOutcome;
use std::path::Path;
use tracing::info;

use crate::cli::{build_scheduler, load_valid_config};

pub async fn run(config_path: &Path) -> Result<()> {
    let config = load_valid_config(config_path)?;
    let scheduler = build_scheduler(&config)?;

    // Seed the previous record so dropped fields are reported against it.
    if let Some(previous) = scheduler.store().load_from_disk() {
        scheduler.store().seed(previous);
    }

    match scheduler.run_cycle().await {
        CycleOutcome::Committed { fields, persisted: true } => {
            info!(fields, path = %config.storage.cache_path, "Refresh complete");
            println!("Committed {} fields to {}", fields, config.storage.cache_path);
            Ok(())
        }
        CycleOutcome::Committed { persisted: false, .. } => {
            bail!("Refresh fetched data but failed to write {}", config.storage.cache_path)
        }
        CycleOutcome::Retained { failures } => {
            bail!("No source produced usable data ({} failed)", failures)
        }
        CycleOutcome::Skipped => bail!("Another refresh is already running"),
    }
}
