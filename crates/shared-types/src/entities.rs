//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: [`Address`], [`Hash`]
//! - **Value**: [`Account`], [`Transaction`], [`TxStatus`]
//! - **Chain**: [`BlockHeader`], [`Block`]
//! - **Staking**: [`Validator`]
//! - **Contracts**: [`ContractDeployment`]
//! - **Reporting**: [`LedgerStats`]

use crate::errors::{IdParseError, RejectReason};
use crate::hashing::{merkle_root, Sha256Writer};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

/// Base units of value. Balances, amounts, fees and stakes all use it.
pub type Amount = u128;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Sequential block number, genesis is `1`.
pub type BlockNumber = u64;

/// Per-account replay counter.
pub type Nonce = u64;

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

macro_rules! hex_identifier {
    ($name:ident, $len:expr) => {
        impl $name {
            /// Length of the identifier in bytes.
            pub const LEN: usize = $len;

            /// Borrow the raw bytes.
            #[must_use]
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(digits).map_err(|_| IdParseError::InvalidHex)?;
                let array: [u8; $len] =
                    bytes
                        .try_into()
                        .map_err(|bytes: Vec<u8>| IdParseError::InvalidLength {
                            expected: $len,
                            actual: bytes.len(),
                        })?;
                Ok(Self(array))
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }
    };
}

/// A 20-byte account address, displayed as `0x` + 40 hex digits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, SerializeDisplay, DeserializeFromStr)]
pub struct Address(pub [u8; 20]);

hex_identifier!(Address, 20);

impl Address {
    /// The zero address. Produces blocks when no validator is active and
    /// collects contract deployment fees.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Derive an address from an Ed25519 public key: the trailing 20 bytes of
    /// `SHA-256(public_key)`.
    #[must_use]
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let digest = Sha256Writer::new().bytes(public_key).finish();
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest.0[12..]);
        Self(out)
    }
}

/// A 32-byte SHA-256 digest, displayed as `0x` + 64 hex digits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, SerializeDisplay, DeserializeFromStr)]
pub struct Hash(pub [u8; 32]);

hex_identifier!(Hash, 32);

impl Hash {
    /// The all-zero digest. Genesis uses it as its parent.
    pub const ZERO: Hash = Hash([0u8; 32]);
}

/// Parent hash recorded by the genesis block.
pub const GENESIS_PARENT_HASH: Hash = Hash::ZERO;

/// Number of the genesis block.
pub const GENESIS_BLOCK_NUMBER: BlockNumber = 1;

// =============================================================================
// VALUE
// =============================================================================

/// A point-in-time view of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    pub balance: Amount,
    pub nonce: Nonce,
}

impl Account {
    /// The view returned for an address the store has never seen.
    #[must_use]
    pub fn empty(address: Address) -> Self {
        Self {
            address,
            balance: 0,
            nonce: 0,
        }
    }
}

/// Lifecycle of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Rejected,
}

/// A value transfer between two accounts.
///
/// `hash` commits to `from`, `to`, `amount`, `nonce` and `fee`. The status and
/// bookkeeping fields are deliberately outside the hash because they change
/// while the transaction moves through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: Hash,
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    pub nonce: Nonce,
    pub fee: Amount,
    pub status: TxStatus,
    /// Admission time, also the mempool arrival key.
    pub submitted_at: Timestamp,
    /// Set once the transaction is sealed into a block.
    pub block_number: Option<BlockNumber>,
    /// Set once the transaction is dropped.
    pub rejection: Option<RejectReason>,
}

impl Transaction {
    /// Build a pending transaction and compute its content hash.
    #[must_use]
    pub fn new(
        from: Address,
        to: Address,
        amount: Amount,
        nonce: Nonce,
        fee: Amount,
        submitted_at: Timestamp,
    ) -> Self {
        Self {
            hash: Self::content_hash(&from, &to, amount, nonce, fee),
            from,
            to,
            amount,
            nonce,
            fee,
            status: TxStatus::Pending,
            submitted_at,
            block_number: None,
            rejection: None,
        }
    }

    /// Canonical encoding: `from ‖ to ‖ amount ‖ nonce ‖ fee`, integers big-endian.
    ///
    /// This is both the hash preimage and the payload a wallet signs.
    #[must_use]
    pub fn canonical_bytes(
        from: &Address,
        to: &Address,
        amount: Amount,
        nonce: Nonce,
        fee: Amount,
    ) -> Vec<u8> {
        let mut out = Vec::with_capacity(20 + 20 + 16 + 8 + 16);
        out.extend_from_slice(from.as_bytes());
        out.extend_from_slice(to.as_bytes());
        out.extend_from_slice(&amount.to_be_bytes());
        out.extend_from_slice(&nonce.to_be_bytes());
        out.extend_from_slice(&fee.to_be_bytes());
        out
    }

    /// SHA-256 over [`Transaction::canonical_bytes`].
    #[must_use]
    pub fn content_hash(
        from: &Address,
        to: &Address,
        amount: Amount,
        nonce: Nonce,
        fee: Amount,
    ) -> Hash {
        Sha256Writer::new()
            .bytes(&Self::canonical_bytes(from, to, amount, nonce, fee))
            .finish()
    }

    /// Recompute the hash from the current field values.
    #[must_use]
    pub fn compute_hash(&self) -> Hash {
        Self::content_hash(&self.from, &self.to, self.amount, self.nonce, self.fee)
    }

    /// Total debited from the sender, `None` on overflow.
    #[must_use]
    pub fn total_debit(&self) -> Option<Amount> {
        self.amount.checked_add(self.fee)
    }

    /// Mark as sealed into `block_number`.
    pub fn confirm(&mut self, block_number: BlockNumber) {
        self.status = TxStatus::Confirmed;
        self.block_number = Some(block_number);
        self.rejection = None;
    }

    /// Mark as dropped with a recorded reason.
    pub fn reject(&mut self, reason: RejectReason) {
        self.status = TxStatus::Rejected;
        self.block_number = None;
        self.rejection = Some(reason);
    }
}

// =============================================================================
// CHAIN
// =============================================================================

/// Header fields covered by the block hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub number: BlockNumber,
    pub timestamp: Timestamp,
    pub previous_hash: Hash,
    pub producer: Address,
    /// Account state commitment after applying the block.
    pub state_root: Hash,
    /// Merkle root over the included transaction hashes.
    pub transactions_root: Hash,
}

impl BlockHeader {
    /// `SHA-256(number ‖ timestamp ‖ previous_hash ‖ producer ‖ state_root ‖ transactions_root)`.
    #[must_use]
    pub fn compute_hash(&self) -> Hash {
        Sha256Writer::new()
            .u64(self.number)
            .u64(self.timestamp)
            .bytes(self.previous_hash.as_bytes())
            .bytes(self.producer.as_bytes())
            .bytes(self.state_root.as_bytes())
            .bytes(self.transactions_root.as_bytes())
            .finish()
    }
}

/// A sealed block. Immutable once appended to the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    pub hash: Hash,
}

impl Block {
    /// Seal a block: fill in the transactions root and compute the hash.
    #[must_use]
    pub fn seal(
        number: BlockNumber,
        timestamp: Timestamp,
        previous_hash: Hash,
        producer: Address,
        state_root: Hash,
        transactions: Vec<Transaction>,
    ) -> Self {
        let tx_hashes: Vec<Hash> = transactions.iter().map(|tx| tx.hash).collect();
        let header = BlockHeader {
            number,
            timestamp,
            previous_hash,
            producer,
            state_root,
            transactions_root: merkle_root(&tx_hashes),
        };
        let hash = header.compute_hash();
        Self {
            header,
            transactions,
            hash,
        }
    }

    /// The genesis block: number 1, no transactions, zero parent and producer.
    #[must_use]
    pub fn genesis(timestamp: Timestamp, state_root: Hash) -> Self {
        Self::seal(
            GENESIS_BLOCK_NUMBER,
            timestamp,
            GENESIS_PARENT_HASH,
            Address::ZERO,
            state_root,
            Vec::new(),
        )
    }

    #[must_use]
    pub fn number(&self) -> BlockNumber {
        self.header.number
    }

    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.header.timestamp
    }

    #[must_use]
    pub fn previous_hash(&self) -> Hash {
        self.header.previous_hash
    }

    #[must_use]
    pub fn is_genesis(&self) -> bool {
        self.header.number == GENESIS_BLOCK_NUMBER
    }

    /// Recompute every commitment and compare with the stored values.
    ///
    /// Checks each transaction's content hash, the transactions root and the
    /// header hash.
    #[must_use]
    pub fn verify_hash(&self) -> bool {
        if self
            .transactions
            .iter()
            .any(|tx| tx.compute_hash() != tx.hash)
        {
            return false;
        }
        let tx_hashes: Vec<Hash> = self.transactions.iter().map(|tx| tx.hash).collect();
        merkle_root(&tx_hashes) == self.header.transactions_root
            && self.header.compute_hash() == self.hash
    }
}

// =============================================================================
// STAKING
// =============================================================================

/// A participant eligible to produce blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub id: u64,
    pub address: Address,
    pub stake: Amount,
    pub active: bool,
    pub joined_at: Timestamp,
}

// =============================================================================
// CONTRACTS
// =============================================================================

/// Receipt of an opaque contract deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDeployment {
    pub address: Address,
    pub deployer: Address,
    pub code_hash: Hash,
    pub gas_used: u64,
    pub fee: Amount,
    pub deployed_at: Timestamp,
}

// =============================================================================
// REPORTING
// =============================================================================

/// Aggregate counters and gauges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub running: bool,
    pub block_height: BlockNumber,
    pub total_blocks: u64,
    pub total_transactions: u64,
    pub pending_transactions: u64,
    pub total_validators: u64,
    pub total_wallets: u64,
    pub total_stake: Amount,
    pub total_issued: Amount,
    pub total_contracts: u64,
    /// Confirmed transactions per second over the recent block window.
    pub tps: f64,
    /// Connected event subscribers.
    pub peers: u64,
}
