//! # Quantum-Chain Ledger Node
//!
//! Loads configuration, restores the last snapshot, serves the API gateway
//! and writes a fresh snapshot on Ctrl+C.
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::sync::Arc;

use anyhow::{Context, Result};
use node_runtime::{load_config, NodeRuntime};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config().context("failed to load configuration")?;
    let runtime = Arc::new(NodeRuntime::new(config)?);

    let mut server = tokio::spawn({
        let runtime = Arc::clone(&runtime);
        async move { runtime.run().await }
    });

    info!("Node is running. Press Ctrl+C to stop.");
    let served = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
            runtime.shutdown();
            server.await
        }
        finished = &mut server => finished,
    };

    let served = served.context("gateway task panicked")?;
    if let Err(e) = &served {
        error!("API gateway stopped: {e:#}");
    }

    runtime.persist().context("failed to persist ledger snapshot")?;
    info!("Shutdown complete");
    served
}
