//! Facade Daemon - Main entry point
//!
//! Runs a viewing session behind a REST API and serves the browser viewer
//! together with the model directory.

mod api;
mod config;
mod fetch;
mod server;
mod session;
mod state;
mod ws;

use anyhow::{Context, Result};
use clap::Parser;
use facade_core::ThemeName;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "facade")]
#[command(about = "Building model viewer session daemon")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "facade.toml")]
    config: PathBuf,

    /// Bind address for web server
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory model files are served and loaded from
    #[arg(short, long)]
    models: Option<PathBuf>,

    /// Initial theme (day or night)
    #[arg(short, long)]
    theme: Option<ThemeName>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write a default configuration file to --config and exit
    #[arg(long)]
    write_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Facade v{}", env!("CARGO_PKG_VERSION"));

    if args.write_default_config {
        config::save_default_config(&args.config)?;
        info!(path = %args.config.display(), "Wrote default configuration");
        return Ok(());
    }

    // Load configuration
    let mut config = config::load_config(&args.config)?;

    if let Some(bind) = args.bind {
        config.daemon.bind = bind;
    }
    if let Some(models) = args.models {
        config.viewer.models.path = models;
    }
    if let Some(theme) = args.theme {
        config.viewer.theme.initial = theme;
    }

    info!(
        models = %config.viewer.models.path.display(),
        theme = %config.viewer.theme.initial,
        "Configuration loaded"
    );

    let state = state::AppState::new(config.clone()).context("Failed to start session")?;
    server::run(state, &config.daemon.bind).await
}
