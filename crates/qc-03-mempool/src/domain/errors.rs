//! Mempool error types.

use shared_types::{Address, Hash, Nonce, RejectReason};

/// Mempool error type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MempoolError {
    /// Transaction already exists in the pool.
    DuplicateTransaction(Hash),

    /// Pool has reached maximum capacity.
    PoolFull { capacity: usize },

    /// Nonce does not extend the sender's pending queue.
    NonceGap {
        sender: Address,
        expected: Nonce,
        actual: Nonce,
    },

    /// Transaction not found in the pool.
    TransactionNotFound(Hash),
}

impl std::fmt::Display for MempoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateTransaction(hash) => write!(f, "Duplicate transaction: {}", hash),
            Self::PoolFull { capacity } => {
                write!(f, "Pool full at {} transactions", capacity)
            }
            Self::NonceGap {
                sender,
                expected,
                actual,
            } => write!(
                f,
                "Nonce gap for {}: expected {}, got {}",
                sender, expected, actual
            ),
            Self::TransactionNotFound(hash) => write!(f, "Transaction not found: {}", hash),
        }
    }
}

impl std::error::Error for MempoolError {}

impl From<MempoolError> for RejectReason {
    fn from(err: MempoolError) -> Self {
        match err {
            MempoolError::DuplicateTransaction(_) | MempoolError::TransactionNotFound(_) => {
                RejectReason::DuplicateTransaction
            }
            MempoolError::PoolFull { capacity } => RejectReason::MempoolFull { capacity },
            MempoolError::NonceGap {
                expected, actual, ..
            } => RejectReason::NonceMismatch {
                expected,
                got: actual,
            },
        }
    }
}
