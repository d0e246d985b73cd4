//! Configuration for block assembly.

use crate::error::{AssemblyError, AssemblyResult};
use serde::{Deserialize, Serialize};
use shared_types::Timestamp;

/// Block assembly configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Maximum transfers sealed into one block.
    pub max_transactions_per_block: usize,

    /// Seal an empty block once this much time has passed since the head.
    pub heartbeat_interval_ms: u64,

    /// Fixed genesis timestamp; the first tick's clock reading when unset.
    pub genesis_timestamp: Option<Timestamp>,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            max_transactions_per_block: 10,
            heartbeat_interval_ms: 30_000,
            genesis_timestamp: None,
        }
    }
}

impl AssemblyConfig {
    /// Small blocks, frequent heartbeats, pinned genesis.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            max_transactions_per_block: 4,
            heartbeat_interval_ms: 1_000,
            genesis_timestamp: Some(0),
        }
    }

    pub fn validate(&self) -> AssemblyResult<()> {
        if self.max_transactions_per_block == 0 {
            return Err(AssemblyError::InvalidConfig(
                "max_transactions_per_block must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
