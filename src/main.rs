//! Keeper server (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            │                    KEEPER                    │
//!            │                                              │
//!  config ──▶│  startup ──▶ Keeper::new ──▶ open store      │
//!            │                  │                           │
//!            │                  ▼                           │
//!            │   start ──▶ [web] [web] ... (one task each)  │
//!            │                  │                           │
//!  SIGINT ──▶│   wait_for_termination                       │
//!  SIGTERM   │                  │                           │
//!            │                  ▼                           │
//!            │   stop ──▶ [web] [web] ... (one task each)   │
//!            │                  │                           │
//!            │   drain in-flight ──▶ close store ──▶ exit   │
//!            └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use keeper_server::config::{self, KeeperConfig};
use keeper_server::lifecycle::startup;
use keeper_server::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "keeper-server")]
#[command(about = "Runs the keeper endpoints until SIGINT/SIGTERM", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => KeeperConfig::default(),
    };

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.observability.log_level);
    logging::init(level);

    tracing::info!("keeper-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        storage = %config.storage.path,
        endpoints = config.endpoints.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let keeper = startup::build_os_keeper(&config).await?;
    keeper.run().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
