//! # Validator Registry Subsystem (qc-04)
//!
//! Stake-weighted set of accounts eligible to produce blocks.
//!
//! ## Staking
//!
//! Registration requires `stake >= MINIMUM_STAKE` and enough *available*
//! balance (the caller subtracts pending mempool debits). The stake is debited
//! from the account in the same call that inserts the validator. Unstaking
//! deactivates the validator and credits the stake back. At most
//! `max_validators` may be active at once.
//!
//! ## Producer Selection
//!
//! ```text
//! seed  = SHA-256(previous_hash ‖ block_number)
//! draw  = u128(seed[0..16]) mod total_active_stake
//! walk active validators in registration order, summing stake;
//! the first whose running sum exceeds `draw` produces the block.
//! ```
//!
//! The choice is reproducible from chain history alone.

pub mod domain;

pub use domain::errors::{RegistryError, RegistryResult};
pub use domain::registry::{ValidatorRegistry, MAX_VALIDATORS, MINIMUM_STAKE};
