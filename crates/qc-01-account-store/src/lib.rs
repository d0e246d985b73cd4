//! # Account Store Subsystem (qc-01)
//!
//! Sole writer of monetary state. Owns every account balance and nonce.
//!
//! ## Responsibilities
//!
//! | Operation            | Effect                                                  |
//! |----------------------|---------------------------------------------------------|
//! | `get`                | read-only view, zero account if unseen                  |
//! | `open` / `credit`    | create or fund an account                               |
//! | `debit`              | remove funds, never below zero                          |
//! | `reserve_nonce`      | hand out the next nonce at admission                    |
//! | `confirm_nonce`      | mark a nonce as used at sealing                         |
//! | `release_reservations` | rewind reservations after dropped transactions        |
//! | `apply_transfer`     | atomic debit + credit + fee + nonce confirmation        |
//!
//! ## Invariants
//!
//! - Balances never go negative (`u128`, checked arithmetic).
//! - `confirmed nonce <= reserved nonce`, and confirmed nonces advance by one.
//! - A failed mutation leaves the store exactly as it was.

pub mod domain;

pub use domain::errors::{StateError, StateResult};
pub use domain::store::AccountStore;
