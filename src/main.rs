use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use city_explorer::{AppState, ExplorerConfig, logging, web};

#[derive(Debug, Parser)]
#[command(name = "city-explorer", version, about = "Location lookup and enrichment API")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overrides config and PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        ExplorerConfig::load_from_path(cli.config).context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    logging::init(&config.logging)?;
    info!("Starting City Explorer v{}", city_explorer::VERSION);
    for provider in config.providers_missing_keys() {
        warn!("No API key configured for {}, its endpoint will fail", provider);
    }

    let state = AppState::from_config(&config).await?;
    web::run(&config.server, state).await
}
