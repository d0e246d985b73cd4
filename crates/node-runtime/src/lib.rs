//! # Quantum-Chain Node Runtime
//!
//! Process wiring for the single-node ledger:
//!
//! - `config` - layered configuration (defaults, JSON file, environment)
//! - `persistence` - locked snapshot store
//! - `runtime` - boot, serve, shutdown
//!
//! ```text
//! load_config() ──→ NodeRuntime::new ──→ SnapshotStore::load ──→ Ledger::restore
//!                                                      (none) ──→ Ledger::with_parts
//!                         │
//!                         ↓
//!                  NodeRuntime::run ──→ ApiGatewayService::serve_on
//!                         │
//!                  ctrl-c / shutdown()
//!                         ↓
//!                  NodeRuntime::persist ──→ SnapshotStore::save
//! ```

pub mod config;
pub mod persistence;
pub mod runtime;

pub use config::{load_config, load_config_from, ConfigError, NodeConfig, StorageConfig};
pub use persistence::{PersistenceError, SnapshotStore};
pub use runtime::NodeRuntime;
