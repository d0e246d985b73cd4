//! # Block Assembly Subsystem (qc-05)
//!
//! Turns pending transactions into sealed blocks.
//!
//! ## State Machine
//!
//! ```text
//!            tick
//!   ┌──────┐ ───→ ┌────────────┐  seal   ┌────────┐
//!   │ Idle │      │ Assembling │ ──────→ │ Sealed │
//!   └──────┘ ←─── └────────────┘         └────────┘
//!      ↑    skip                              │
//!      └──────────────────────────────────────┘
//! ```
//!
//! ## One Tick
//!
//! 1. No chain head: seal genesis (number 1, zero parent, zero producer).
//! 2. Pool empty and the heartbeat has not elapsed: `Skipped`, nothing changes.
//! 3. Select the producer (zero address when no validator is active).
//! 4. Drain up to `max_transactions_per_block` and apply each transfer.
//!    A failed apply rejects that transaction and every later one from the
//!    same sender (`PredecessorRejected`), and releases the sender's
//!    reserved nonces.
//! 5. Seal with `timestamp = max(now, head.timestamp)`.
//!
//! Identical inputs and timestamp always give the same block hash.

pub mod config;
pub mod domain;
pub mod error;

pub use config::AssemblyConfig;
pub use domain::assembler::{AssemblyContext, AssemblyOutcome, BlockAssembler};
pub use domain::state::AssemblerState;
pub use error::{AssemblyError, AssemblyResult};
