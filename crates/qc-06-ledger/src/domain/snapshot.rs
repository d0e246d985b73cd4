//! # Ledger Snapshot
//!
//! Everything needed to rebuild a ledger: the chain, the value journal,
//! account state, the validator set, pending transactions and bookkeeping.
//! Field order is the persisted order; the type is encoded with `bincode` by
//! the node runtime.
//!
//! Account state, validators and supply are redundant with chain + journal
//! and are only accepted when they equal the replay.

use super::journal::JournalRecord;
use serde::{Deserialize, Serialize};
use shared_types::{
    Account, Address, Amount, Block, ContractDeployment, PublicKey, Transaction, Validator,
};

/// Point-in-time copy of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Sealed blocks from genesis, keyed by position (`number - 1`).
    pub blocks: Vec<Block>,
    /// Account state in address order.
    pub accounts: Vec<Account>,
    /// Every validator in registration order, inactive ones included.
    pub validators: Vec<Validator>,
    /// Pending transactions in drain order.
    pub pending: Vec<Transaction>,
    /// Transaction history in submission order.
    pub transactions: Vec<Transaction>,
    pub contracts: Vec<ContractDeployment>,
    /// Registered wallet keys.
    pub keys: Vec<(Address, PublicKey)>,
    /// Value ever created (genesis allocations plus wallet grants).
    pub total_issued: Amount,
    /// Value changes outside sealed transfers.
    pub journal: Vec<JournalRecord>,
}

impl LedgerSnapshot {
    /// Height of the snapshotted chain, 0 when empty.
    #[must_use]
    pub fn height(&self) -> u64 {
        self.blocks.last().map_or(0, Block::number)
    }
}
