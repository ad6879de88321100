//! # Gradient Ledger Node
//!
//! Loads configuration, provisions the client identity, opens the ledger
//! and serves the Aggregation Gateway until Ctrl+C.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use node_runtime::container::LoggingConfig;
use node_runtime::{NodeConfig, NodeRuntime};

/// `RUST_LOG` wins over the configured level.
fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("Invalid log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down...");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging)?;

    let runtime = NodeRuntime::new(config)?;
    info!("Node is running. Press Ctrl+C to stop.");

    runtime.run(shutdown_signal()).await
}
