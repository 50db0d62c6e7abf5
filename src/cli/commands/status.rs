//! Status command implementation.

use anyhow::Result;
use marine_cache::{CacheStore, StalenessPolicy};
use marine_core::types::now_epoch;
use marine_monitor::StatusReport;
use std::path::Path;

use crate::cli::{load_valid_config, StatusArgs};

pub async fn run(args: StatusArgs, config_path: &Path) -> Result<()> {
    let config = load_valid_config(config_path)?;
    let store = CacheStore::new(&config.storage.cache_path);
    let policy = StalenessPolicy::new(config.refresh.interval());

    let snapshot = store.load_from_disk();
    let health = policy.health(snapshot.as_ref(), now_epoch());
    let report = StatusReport::new(health, snapshot.as_ref());

    match args.output.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => {
            println!("Cache: {}", config.storage.cache_path);
            print!("{}", report);
        }
    }
    Ok(())
}
