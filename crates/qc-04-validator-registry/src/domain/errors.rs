//! Registry error types.

use qc_01_account_store::StateError;
use shared_types::{Address, Amount};
use thiserror::Error;

/// Errors raised by staking operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("stake {stake} below minimum {minimum}")]
    StakeTooLow { stake: Amount, minimum: Amount },

    #[error("insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: Amount, required: Amount },

    #[error("{0} is already an active validator")]
    AlreadyRegistered(Address),

    #[error("validator set is full at {max} validators")]
    ValidatorSetFull { max: usize },

    #[error("{0} is not an active validator")]
    UnknownValidator(Address),

    #[error("account error: {0}")]
    State(#[from] StateError),
}

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
