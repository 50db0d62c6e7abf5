//! CLI definitions.

pub mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use marine_cache::CacheStore;
use marine_config::{load_config, AppConfig};
use marine_core::traits::SeriesFetcher;
use marine_data::{load_tide_fetcher, open_meteo_fetchers, UpstreamUrls};
use marine_refresh::{RefreshScheduler, SchedulerConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "marine")]
#[command(author, version, about = "Marine conditions forecast cache")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the refresh scheduler and the HTTP API
    Serve(ServeArgs),
    /// Run one refresh cycle and exit
    Refresh,
    /// Show the state of the persisted cache
    Status(StatusArgs),
    /// Check the tide model and print the next 24 hours
    VerifyTide,
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Bind address, overrides server.bind
    #[arg(short, long)]
    pub bind: Option<String>,
}

#[derive(clap::Args)]
pub struct StatusArgs {
    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: String,
}

/// Load and validate the configuration.
pub fn load_valid_config(path: &Path) -> Result<AppConfig> {
    let config = load_config(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Build the fetchers for every configured source.
///
/// A tide model that fails to load is left out; its field is then
/// missing from every snapshot.
pub fn build_fetchers(config: &AppConfig) -> Result<Vec<Arc<dyn SeriesFetcher>>> {
    let location = config.location.to_location();
    let urls = UpstreamUrls {
        weather: config.upstream.weather_url.clone(),
        marine: config.upstream.marine_url.clone(),
        air_quality: config.upstream.air_quality_url.clone(),
    };
    let mut fetchers = open_meteo_fetchers(&urls, &location, config.refresh.fetch_timeout())
        .context("Failed to build HTTP fetchers")?;

    if config.tide.enabled {
        match load_tide_fetcher(
            Path::new(&config.tide.constants_path),
            &location,
            config.tide.datum_offset_cm,
        ) {
            Ok(tide) => fetchers.push(Arc::new(tide)),
            Err(e) => warn!(
                path = %config.tide.constants_path,
                error = %e,
                "Tide model unavailable, serving without tide"
            ),
        }
    }

    info!(sources = fetchers.len(), "Fetchers ready");
    Ok(fetchers)
}

/// Wire the cache store and scheduler from configuration.
pub fn build_scheduler(config: &AppConfig) -> Result<Arc<RefreshScheduler>> {
    let store = Arc::new(CacheStore::new(&config.storage.cache_path));
    let scheduler_config = SchedulerConfig {
        interval: config.refresh.interval(),
        fetch_timeout: config.refresh.fetch_timeout(),
        hours: config.forecast.hours,
        tz_offset_minutes: config.forecast.tz_offset_minutes,
        anchor: config.forecast.anchor,
    };
    Ok(Arc::new(RefreshScheduler::new(
        build_fetchers(config)?,
        store,
        scheduler_config,
    )))
}
