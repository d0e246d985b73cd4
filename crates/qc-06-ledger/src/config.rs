//! Ledger configuration.

use crate::domain::contracts::ContractConfig;
use qc_03_mempool::MempoolConfig;
use qc_04_validator_registry::{MAX_VALIDATORS, MINIMUM_STAKE};
use qc_05_block_assembly::AssemblyConfig;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount};

/// Funds credited to an address before genesis is sealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAllocation {
    pub address: Address,
    pub amount: Amount,
}

/// Complete ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Balance given to every wallet created through the ledger.
    pub initial_balance: Amount,
    /// Block production period.
    pub block_interval_ms: u64,
    /// Smallest stake accepted at registration.
    pub minimum_stake: Amount,
    /// Largest active validator set; also bounds the kept history.
    pub max_validators: usize,
    /// Verify ed25519 signatures on every submission.
    pub require_signatures: bool,
    /// Balances that exist before genesis.
    pub genesis_allocations: Vec<GenesisAllocation>,
    /// Per-subscriber event buffer.
    pub event_capacity: usize,
    /// Blocks averaged by the throughput gauge.
    pub stats_window: usize,
    pub mempool: MempoolConfig,
    pub assembly: AssemblyConfig,
    pub contracts: ContractConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_balance: 1000,
            block_interval_ms: 3_000,
            minimum_stake: MINIMUM_STAKE,
            max_validators: MAX_VALIDATORS,
            require_signatures: false,
            genesis_allocations: Vec::new(),
            event_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
            stats_window: 10,
            mempool: MempoolConfig::default(),
            assembly: AssemblyConfig::default(),
            contracts: ContractConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Fast blocks, small pool, pinned genesis time.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            block_interval_ms: 50,
            event_capacity: 256,
            mempool: MempoolConfig::for_testing(),
            assembly: AssemblyConfig::for_testing(),
            ..Self::default()
        }
    }

    /// Sum of every genesis allocation.
    #[must_use]
    pub fn genesis_supply(&self) -> Amount {
        self.genesis_allocations
            .iter()
            .fold(0, |acc: Amount, a| acc.saturating_add(a.amount))
    }
}
