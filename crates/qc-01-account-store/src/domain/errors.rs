//! Account store error types.

use shared_types::{Address, Amount, Nonce, RejectReason};
use thiserror::Error;

/// Errors raised by account mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// Debit larger than the balance.
    #[error("insufficient funds in {address}: available {available}, required {required}")]
    InsufficientFunds {
        address: Address,
        available: Amount,
        required: Amount,
    },

    /// The account has never been created.
    #[error("unknown account {0}")]
    UnknownAccount(Address),

    /// `open` called for an address that already exists.
    #[error("account {0} already exists")]
    AccountExists(Address),

    /// Credits and debits must move a positive amount.
    #[error("amount must be positive")]
    ZeroAmount,

    /// Credit would exceed `u128::MAX`.
    #[error("balance overflow for {0}")]
    BalanceOverflow(Address),

    /// A nonce was confirmed out of sequence.
    #[error("nonce out of order for {address}: expected {expected}, got {got}")]
    NonceOutOfOrder {
        address: Address,
        expected: Nonce,
        got: Nonce,
    },
}

/// Result alias for account store operations.
pub type StateResult<T> = Result<T, StateError>;

impl From<StateError> for RejectReason {
    fn from(err: StateError) -> Self {
        match err {
            StateError::InsufficientFunds {
                available,
                required,
                ..
            } => RejectReason::InsufficientFunds {
                available,
                required,
            },
            StateError::NonceOutOfOrder { expected, got, .. } => {
                RejectReason::NonceMismatch { expected, got }
            }
            StateError::UnknownAccount(_) => RejectReason::UnknownSender,
            StateError::AccountExists(_)
            | StateError::ZeroAmount
            | StateError::BalanceOverflow(_) => RejectReason::InvalidAmount,
        }
    }
}
