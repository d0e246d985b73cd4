//! # Error Types
//!
//! Errors shared across subsystems.

use crate::entities::{Amount, Nonce};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to parse a hex identifier (`Address`, `Hash`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("invalid hex encoding")]
    InvalidHex,

    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Why a transaction was refused at admission or dropped at sealing.
///
/// Recorded on the transaction itself and carried by `TransactionRejected`
/// events, so it must stay serializable.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Amount is zero or amount + fee overflows.
    #[error("invalid amount")]
    InvalidAmount,

    /// The sender has no account.
    #[error("unknown sender")]
    UnknownSender,

    /// Available balance cannot cover amount + fee.
    #[error("insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: Amount, required: Amount },

    /// Supplied nonce is not `account.nonce + pending`.
    #[error("nonce mismatch: expected {expected}, got {got}")]
    NonceMismatch { expected: Nonce, got: Nonce },

    /// Signature missing or not valid for the sender's key.
    #[error("invalid signature")]
    InvalidSignature,

    /// The mempool is at capacity.
    #[error("mempool full at {capacity} transactions")]
    MempoolFull { capacity: usize },

    /// A transaction with the same hash is already pending.
    #[error("duplicate transaction")]
    DuplicateTransaction,

    /// An earlier transaction from the same sender was dropped while sealing.
    #[error("predecessor transaction from the same sender was rejected")]
    PredecessorRejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_reason_display() {
        let err = RejectReason::NonceMismatch {
            expected: 1,
            got: 0,
        };
        assert_eq!(err.to_string(), "nonce mismatch: expected 1, got 0");
    }

    #[test]
    fn test_reject_reason_wire_format() {
        let json = serde_json::to_value(RejectReason::InsufficientFunds {
            available: 10,
            required: 20,
        })
        .unwrap();
        assert_eq!(json["insufficient_funds"]["available"], 10);
        assert_eq!(
            serde_json::to_value(RejectReason::UnknownSender).unwrap(),
            "unknown_sender"
        );
    }
}
