//! Error types for block assembly.

use thiserror::Error;

/// Result alias for assembly operations.
pub type AssemblyResult<T> = std::result::Result<T, AssemblyError>;

/// Errors raised while setting up the assembler.
///
/// Producing a block never fails: transfers that cannot be applied are
/// rejected and reported in the outcome instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
