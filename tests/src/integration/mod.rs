//! Integration tests and the fixtures they share.

pub mod api_flows;
pub mod ledger_flows;
pub mod properties;
pub mod runtime_flows;

use qc_06_ledger::{Ledger, LedgerConfig};
use shared_bus::InMemoryEventBus;
use shared_types::{Address, ManualTimeSource};
use std::sync::Arc;

/// A ledger on a manual clock, with no producer task unless started
/// inside a runtime.
pub struct TestLedger {
    pub clock: Arc<ManualTimeSource>,
    pub ledger: Arc<Ledger>,
}

impl TestLedger {
    pub fn new(config: LedgerConfig) -> Self {
        let clock = Arc::new(ManualTimeSource::new(0));
        let bus = Arc::new(InMemoryEventBus::with_capacity(config.event_capacity));
        let ledger = Ledger::with_parts(config, clock.clone(), bus).expect("valid config");
        Self {
            clock,
            ledger: Arc::new(ledger),
        }
    }

    pub fn started(config: LedgerConfig) -> Self {
        let this = Self::new(config);
        this.ledger.start().expect("fresh ledger starts");
        this
    }

    pub fn wallet(&self) -> Address {
        self.ledger.create_wallet().expect("wallet").address
    }

    /// Move the clock forward and run one production tick.
    pub fn tick(&self, advance_ms: u64) -> Option<Arc<shared_types::Block>> {
        self.clock.advance(advance_ms);
        self.ledger.produce_block()
    }
}

/// Fixed-address config so two ledgers see identical state.
pub fn funded_config(addresses: &[Address], amount: u128) -> LedgerConfig {
    LedgerConfig {
        genesis_allocations: addresses
            .iter()
            .map(|address| qc_06_ledger::GenesisAllocation {
                address: *address,
                amount,
            })
            .collect(),
        ..LedgerConfig::for_testing()
    }
}
