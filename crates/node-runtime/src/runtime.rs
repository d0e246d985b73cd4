//! # Node Runtime
//!
//! Owns the ledger, the snapshot store and the gateway for one process.
//!
//! ## Startup Sequence
//!
//! 1. Lock the data directory (if persistence is enabled)
//! 2. Restore the last snapshot, or build a fresh ledger from genesis config
//! 3. Start block production when `auto_start` is set
//! 4. Serve the API gateway until shutdown is signalled
//!
//! On shutdown the caller invokes [`NodeRuntime::persist`], which stops the
//! producer and writes the snapshot.

use crate::config::NodeConfig;
use crate::persistence::{PersistenceError, SnapshotStore};
use anyhow::{Context, Result};
use qc_06_ledger::Ledger;
use qc_07_api_gateway::ApiGatewayService;
use shared_bus::InMemoryEventBus;
use shared_types::{SystemTimeSource, TimeSource};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

/// The main node runtime.
pub struct NodeRuntime {
    config: NodeConfig,
    ledger: Arc<Ledger>,
    store: Option<SnapshotStore>,
    shutdown_tx: watch::Sender<bool>,
}

impl NodeRuntime {
    /// Build the runtime on the wall clock.
    pub fn new(config: NodeConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemTimeSource))
    }

    /// Build the runtime with an injected clock.
    pub fn with_clock(config: NodeConfig, clock: Arc<dyn TimeSource>) -> Result<Self> {
        let store = config
            .storage
            .data_dir
            .as_ref()
            .map(|dir| SnapshotStore::open(dir, config.storage.min_free_bytes))
            .transpose()
            .context("failed to open data directory")?;

        let snapshot = match &store {
            Some(store) => store.load().context("failed to read snapshot")?,
            None => None,
        };

        let bus = Arc::new(InMemoryEventBus::with_capacity(config.ledger.event_capacity));
        let ledger = match snapshot {
            Some(snapshot) => Ledger::restore(config.ledger.clone(), snapshot, clock, bus)
                .context("stored snapshot failed verification")?,
            None => {
                info!("No snapshot found, starting from genesis");
                Ledger::with_parts(config.ledger.clone(), clock, bus)
                    .context("invalid genesis configuration")?
            }
        };

        let (shutdown_tx, _) = watch::channel(false);
        Ok(Self {
            config,
            ledger: Arc::new(ledger),
            store,
            shutdown_tx,
        })
    }

    #[must_use]
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    #[must_use]
    pub fn ledger(&self) -> Arc<Ledger> {
        Arc::clone(&self.ledger)
    }

    /// Signal [`NodeRuntime::run`] to stop serving.
    pub fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        self.shutdown_tx.send_replace(true);
    }

    /// Start production (if configured) and serve the gateway on the
    /// configured address until [`NodeRuntime::shutdown`] is called.
    pub async fn run(&self) -> Result<()> {
        let addr = self.config.gateway.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        self.run_on(listener).await
    }

    /// Same as [`NodeRuntime::run`] on an already bound listener.
    pub async fn run_on(&self, listener: TcpListener) -> Result<()> {
        info!("===========================================");
        info!("  Quantum-Chain Ledger Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        if self.config.auto_start && !self.ledger.is_running() {
            self.ledger.start().context("failed to start block production")?;
        }

        let gateway = ApiGatewayService::new(self.config.gateway.clone(), self.ledger())
            .context("invalid gateway configuration")?;

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let shutdown = async move {
            let _ = shutdown_rx.wait_for(|stop| *stop).await;
        };

        gateway
            .serve_on(listener, shutdown)
            .await
            .context("API gateway failed")?;
        Ok(())
    }

    /// Stop production and write the snapshot. A no-op store-wise when
    /// persistence is disabled.
    pub fn persist(&self) -> Result<(), PersistenceError> {
        self.ledger.stop();
        match &self.store {
            Some(store) => store.save(&self.ledger.snapshot()),
            None => Ok(()),
        }
    }
}
