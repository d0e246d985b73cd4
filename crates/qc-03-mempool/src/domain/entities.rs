//! Mempool configuration.

use serde::{Deserialize, Serialize};

/// Mempool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MempoolConfig {
    /// Maximum transactions in the pool.
    pub max_transactions: usize,
}

impl Default for MempoolConfig {
    fn default() -> Self {
        Self {
            max_transactions: 5000,
        }
    }
}

impl MempoolConfig {
    /// Creates a minimal config for testing.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            max_transactions: 8,
        }
    }
}
