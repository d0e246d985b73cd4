//! # Ledger Errors
//!
//! One taxonomy for every facade operation. Subsystem errors convert at the
//! crate seam so adapters only ever match on [`LedgerError`].

use qc_01_account_store::StateError;
use qc_04_validator_registry::RegistryError;
use qc_05_block_assembly::AssemblyError;
use shared_types::{Address, Amount, BlockNumber, Nonce, RejectReason};
use std::fmt;
use thiserror::Error;

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Kinds of entity a lookup can miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Account,
    Block,
    Transaction,
    Validator,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Account => "account",
            Self::Block => "block",
            Self::Transaction => "transaction",
            Self::Validator => "validator",
        })
    }
}

/// Errors returned by the ledger facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Malformed input.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("amount must be positive and amount + fee must not overflow")]
    InvalidAmount,

    #[error("insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: Amount, required: Amount },

    #[error("nonce mismatch: expected {expected}, got {got}")]
    NonceMismatch { expected: Nonce, got: Nonce },

    #[error("invalid signature")]
    InvalidSignature,

    #[error("mempool full at {capacity} transactions")]
    MempoolFull { capacity: usize },

    #[error("transaction already pending")]
    DuplicateTransaction,

    #[error("stake {stake} below minimum {minimum}")]
    StakeTooLow { stake: Amount, minimum: Amount },

    #[error("{0} is already an active validator")]
    DuplicateValidator(Address),

    #[error("validator set is full at {max} validators")]
    ValidatorSetFull { max: usize },

    #[error("{kind} not found: {id}")]
    UnknownEntity { kind: EntityKind, id: String },

    #[error("node is not running")]
    NodeNotRunning,

    #[error("node is already running")]
    AlreadyRunning,

    /// Persisted history failed verification. Fatal at startup.
    #[error("chain corrupted at block {number}: {reason}")]
    ChainCorrupted { number: BlockNumber, reason: String },
}

impl LedgerError {
    pub fn unknown(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self::UnknownEntity {
            kind,
            id: id.to_string(),
        }
    }

    pub fn corrupted(number: BlockNumber, reason: impl Into<String>) -> Self {
        Self::ChainCorrupted {
            number,
            reason: reason.into(),
        }
    }

    /// Map a transaction rejection, naming the sender when it is unknown.
    #[must_use]
    pub fn from_rejection(reason: RejectReason, sender: Address) -> Self {
        match reason {
            RejectReason::UnknownSender => Self::unknown(EntityKind::Account, sender),
            other => other.into(),
        }
    }
}

impl From<RejectReason> for LedgerError {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::InvalidAmount => Self::InvalidAmount,
            RejectReason::UnknownSender => Self::UnknownEntity {
                kind: EntityKind::Account,
                id: "sender".into(),
            },
            RejectReason::InsufficientFunds {
                available,
                required,
            } => Self::InsufficientFunds {
                available,
                required,
            },
            RejectReason::NonceMismatch { expected, got } => Self::NonceMismatch { expected, got },
            RejectReason::InvalidSignature => Self::InvalidSignature,
            RejectReason::MempoolFull { capacity } => Self::MempoolFull { capacity },
            RejectReason::DuplicateTransaction => Self::DuplicateTransaction,
            RejectReason::PredecessorRejected => {
                Self::Validation("an earlier transaction from this sender was rejected".into())
            }
        }
    }
}

impl From<StateError> for LedgerError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::InsufficientFunds {
                available,
                required,
                ..
            } => Self::InsufficientFunds {
                available,
                required,
            },
            StateError::UnknownAccount(address) => Self::unknown(EntityKind::Account, address),
            StateError::ZeroAmount | StateError::BalanceOverflow(_) => Self::InvalidAmount,
            StateError::NonceOutOfOrder { expected, got, .. } => {
                Self::NonceMismatch { expected, got }
            }
            StateError::AccountExists(address) => {
                Self::Validation(format!("account {address} already exists"))
            }
        }
    }
}

impl From<RegistryError> for LedgerError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::StakeTooLow { stake, minimum } => Self::StakeTooLow { stake, minimum },
            RegistryError::InsufficientFunds {
                available,
                required,
            } => Self::InsufficientFunds {
                available,
                required,
            },
            RegistryError::AlreadyRegistered(address) => Self::DuplicateValidator(address),
            RegistryError::ValidatorSetFull { max } => Self::ValidatorSetFull { max },
            RegistryError::UnknownValidator(address) => {
                Self::unknown(EntityKind::Validator, address)
            }
            RegistryError::State(state) => state.into(),
        }
    }
}

impl From<AssemblyError> for LedgerError {
    fn from(err: AssemblyError) -> Self {
        Self::Validation(err.to_string())
    }
}
