//! # Shared Types Crate
//!
//! Domain entities shared by every ledger subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identifiers, accounts, transactions, blocks and
//!   validators are defined once here and reused by every `qc-*` crate.
//! - **Content Addressing**: every hash is SHA-256 over an explicit big-endian
//!   field encoding (see [`hashing`]), never over a serializer's output.
//! - **Wire Friendly**: `Address` and `Hash` serialize as `0x`-prefixed hex so
//!   the same types flow through JSON adapters and binary snapshots.

pub mod entities;
pub mod errors;
pub mod hashing;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
