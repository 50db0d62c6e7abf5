//! Tide model check.

use anyhow::{bail, Context, Result};
use marine_core::traits::TideModel;
use marine_core::types::{now_epoch, HourlyGrid, WindowAnchor};
use marine_data::HarmonicTideModel;
use std::path::Path;

use crate::cli::load_valid_config;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = load_valid_config(config_path)?;
    let path = Path::new(&config.tide.constants_path);
    println!("Loading tide constants: {}", path.display());

    let model = HarmonicTideModel::from_file(path, config.tide.datum_offset_cm)
        .context("Failed to load tide constants")?;

    let readiness = model.readiness();
    println!(
        "Model point: {:.4}, {:.4}",
        readiness.latitude, readiness.longitude
    );
    println!(
        "Constituents: {} ({} usable)",
        readiness.constituents, readiness.usable
    );
    if !readiness.ready {
        bail!("Tide model is not ready: too few usable constituents");
    }

    let location = config.location.to_location();
    let grid = HourlyGrid::anchored(
        now_epoch(),
        config.forecast.tz_offset_minutes,
        24,
        WindowAnchor::NextHour,
    );
    let heights = model
        .compute_heights(&location, &grid.epochs())
        .context("Tide prediction failed")?;

    println!();
    println!("Next 24 hours at {} (cm above chart datum):", location.name);
    for (i, height) in heights.iter().enumerate() {
        println!("  {}  {:>4}", grid.local_label(i), height);
    }
    Ok(())
}
