//! # Node Configuration
//!
//! Unified configuration for the ledger, the gateway and storage.
//!
//! Sources, later ones winning:
//!
//! 1. Built-in defaults
//! 2. JSON file named by `QC_CONFIG` (missing sections keep their defaults)
//! 3. `QC_*` environment overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `QC_HTTP_PORT` | `gateway.http.port` |
//! | `QC_BLOCK_INTERVAL_MS` | `ledger.block_interval_ms` |
//! | `QC_DATA_DIR` | `storage.data_dir` (`none` disables persistence) |
//! | `QC_AUTO_START` | `auto_start` |
//! | `QC_REQUIRE_SIGNATURES` | `ledger.require_signatures` |

use qc_06_ledger::LedgerConfig;
use qc_07_api_gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

/// Complete node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub ledger: LedgerConfig,
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
    /// Start block production as soon as the node boots.
    pub auto_start: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            gateway: GatewayConfig::default(),
            storage: StorageConfig::default(),
            auto_start: true,
        }
    }
}

impl NodeConfig {
    /// In-memory node on an ephemeral loopback port.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            ledger: LedgerConfig::for_testing(),
            gateway: GatewayConfig::for_testing(),
            storage: StorageConfig {
                data_dir: None,
                ..StorageConfig::default()
            },
            auto_start: false,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Snapshot directory. `None` keeps the ledger in memory only.
    pub data_dir: Option<PathBuf>,
    /// Free space to leave on the volume after writing a snapshot.
    pub min_free_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: Some(PathBuf::from("./data")),
            min_free_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load configuration from the process environment and `QC_CONFIG`.
pub fn load_config() -> Result<NodeConfig, ConfigError> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Load configuration with an injectable variable lookup.
pub fn load_config_from<F>(env: F) -> Result<NodeConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match env("QC_CONFIG") {
        Some(path) => {
            let path = PathBuf::from(path);
            let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            let config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "Loaded configuration file");
            config
        }
        None => NodeConfig::default(),
    };

    apply_env_overrides(&mut config, env);
    Ok(config)
}

fn apply_env_overrides<F>(config: &mut NodeConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = parsed(&env, "QC_HTTP_PORT") {
        config.gateway.http.port = port;
    }
    if let Some(interval) = parsed(&env, "QC_BLOCK_INTERVAL_MS") {
        config.ledger.block_interval_ms = interval;
    }
    if let Some(dir) = env("QC_DATA_DIR") {
        config.storage.data_dir = match dir.trim() {
            "" | "none" => None,
            path => Some(PathBuf::from(path)),
        };
    }
    if let Some(auto_start) = parsed(&env, "QC_AUTO_START") {
        config.auto_start = auto_start;
    }
    if let Some(require) = parsed(&env, "QC_REQUIRE_SIGNATURES") {
        config.ledger.require_signatures = require;
    }
}

fn parsed<F, T>(env: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = env(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}
