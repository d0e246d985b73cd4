//! # Ledger Facade (qc-06)
//!
//! Owns the chain and every mutable subsystem, serializes mutations, drives
//! periodic block production and publishes events.
//!
//! ## Architecture
//!
//! ```text
//!   submit ──→ ┌─────────────┐     ┌──────────┐
//!              │ qc-02 check │ ──→ │ qc-03    │
//!              └─────────────┘     │ mempool  │
//!                                  └────┬─────┘
//!   ticker ──→ ┌─────────────┐  drain   │
//!              │ qc-05 seal  │ ←────────┘
//!              └──────┬──────┘
//!                     │ apply       ┌──────────┐
//!                     ├───────────→ │ qc-01    │
//!                     │ producer    │ accounts │
//!                     ├───────────→ └──────────┘
//!                     │             ┌──────────┐
//!                     └───────────→ │ qc-04    │
//!                                   │ stakes   │
//!                                   └──────────┘
//! ```
//!
//! ## Guarantees
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | Value conservation | Σ balances + Σ active stakes == issued supply |
//! | Restorable state | journal + chain replay must hit every `state_root` |
//! | Nonce contiguity | reservations at admission, confirmation at sealing |
//! | Chain integrity | `verify_chain` recomputes every hash and link |
//! | Deterministic sealing | stake-weighted seed from the parent hash |
//! | Ordered events | published under the writer lock |

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::{GenesisAllocation, LedgerConfig};
pub use domain::contracts::{ContractConfig, TREASURY};
pub use domain::journal::{JournalRecord, ValueEntry};
pub use domain::snapshot::LedgerSnapshot;
pub use domain::views::{AccountSummary, NodeStatus, WalletCreated};
pub use error::{EntityKind, LedgerError, LedgerResult};
pub use service::Ledger;
