//! Read models returned by the facade.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, BlockNumber, Nonce};

/// Account state as seen by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub address: Address,
    /// Confirmed balance.
    pub balance: Amount,
    /// Balance minus pending debits.
    pub available_balance: Amount,
    /// Confirmed nonce.
    pub nonce: Nonce,
    /// Nonce the next submission must carry.
    pub next_nonce: Nonce,
    pub pending_transactions: u64,
}

/// A freshly generated wallet. The private key is only ever returned here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletCreated {
    pub address: Address,
    pub balance: Amount,
    pub nonce: Nonce,
    /// Hex-encoded ed25519 verifying key.
    pub public_key: String,
    /// Hex-encoded ed25519 signing key seed.
    pub private_key: String,
}

/// Lifecycle summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub running: bool,
    pub block_height: BlockNumber,
    pub pending_transactions: u64,
    pub block_interval_ms: u64,
}
