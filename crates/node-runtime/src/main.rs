//! # Ethparser
//!
//! Serves address transaction history reconstructed from a JSON-RPC node.
//!
//! Configuration comes from the environment (a `.env` file in the working
//! directory is loaded first); see [`ethparser_node::config`]. Log verbosity
//! follows `RUST_LOG`, defaulting to `info`.

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ethparser_node::{NodeConfig, NodeRuntime};

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Could not read environment file"),
    }

    let config = NodeConfig::from_env();
    let runtime = NodeRuntime::new(config).context("failed to initialise node runtime")?;

    info!("Node is running. Press Ctrl+C to stop.");
    runtime
        .run(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
