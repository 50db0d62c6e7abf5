//! Serve command implementation.

use anyhow::{Context, Result};
use marine_api::handlers::ApiState;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::cli::{build_scheduler, load_valid_config, ServeArgs};

pub async fn run(args: ServeArgs, config_path: &Path) -> Result<()> {
    let config = load_valid_config(config_path)?;
    info!(
        app = %config.app.name,
        environment = %config.app.environment,
        location = %config.location.name,
        "Starting marine conditions service"
    );

    let scheduler = build_scheduler(&config)?;
    let state = ApiState {
        store: Arc::clone(scheduler.store()),
        policy: scheduler.policy(),
    };

    // Startup and the refresh loop run in the background; reads are
    // answered from the first moment, with has_data=false until data lands.
    let refresh = Arc::clone(&scheduler).spawn();

    let bind = args.bind.unwrap_or(config.server.bind);
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(%bind, "HTTP API listening");

    axum::serve(listener, marine_api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    refresh.abort();
    let stats = scheduler.stats();
    info!(
        cycles = stats.cycles,
        commits = stats.commits,
        retained = stats.retained,
        "Shutdown complete"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
