//! # Transaction Validation Subsystem (qc-02)
//!
//! A pure rules engine: given a transfer request, a snapshot of the sender's
//! account and the sender's pending context, decide whether the transfer may
//! enter the mempool.
//!
//! ## Rule Order
//!
//! ```text
//! request ──→ amount > 0 ──→ sender exists ──→ authenticate ──→ funds ──→ nonce ──→ Accepted
//!                 │               │                 │             │          │
//!                 ↓               ↓                 ↓             ↓          ↓
//!           InvalidAmount   UnknownSender   InvalidSignature  Insufficient  NonceMismatch
//! ```
//!
//! - Funds are checked against the *available* balance: balance minus the
//!   sender's pending debits.
//! - The expected nonce is `account.nonce + pending_count`.
//!
//! Authentication is a port ([`TransactionAuthenticator`]) so deployments
//! choose between [`PermissiveAuthenticator`] and [`Ed25519Authenticator`].

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::ed25519::Ed25519Authenticator;
pub use domain::entities::{PendingContext, TransferRequest, ValidationOutcome};
pub use domain::validator::TransactionValidator;
pub use ports::outbound::{PermissiveAuthenticator, TransactionAuthenticator};
