//! Marine conditions service CLI.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use marine_config::load_config;
use marine_monitor::setup_logging;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level {
        cli::LogLevel::Trace => "trace",
        cli::LogLevel::Debug => "debug",
        cli::LogLevel::Info => "info",
        cli::LogLevel::Warn => "warn",
        cli::LogLevel::Error => "error",
    };
    let logging = load_config(&cli.config).ok().map(|c| c.logging);
    let json = cli.json_logs || logging.as_ref().is_some_and(|l| l.is_json());
    let log_file = logging.and_then(|l| l.file);
    let _guard = setup_logging(log_level, json, log_file.as_deref().map(Path::new));

    // Execute command
    match cli.command {
        Commands::Serve(args) => cli::commands::serve::run(args, &cli.config).await,
        Commands::Refresh => cli::commands::refresh::run(&cli.config).await,
        Commands::Status(args) => cli::commands::status::run(args, &cli.config).await,
        Commands::VerifyTide => cli::commands::verify_tide::run(&cli.config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
