//! # Transaction Pool (Mempool) Subsystem (qc-03)
//!
//! Holds admitted-but-unconfirmed transactions until block assembly drains
//! them.
//!
//! ## Domain Invariants
//!
//! | Invariant                  | Enforcement                                       |
//! |----------------------------|---------------------------------------------------|
//! | No duplicate hashes        | `TransactionPool::admit` checks `by_hash`         |
//! | Per-sender FIFO by nonce   | `admit` requires contiguous nonces, `drain` takes heads only |
//! | Bounded size               | `admit` rejects new entries at capacity (reject-new) |
//! | Deterministic drain        | arrival, then higher fee, then hash               |
//!
//! ## Drain Order
//!
//! ```text
//! sender A: [n0 t=5] [n1 t=6]          heap of sender heads
//! sender B: [n0 t=5 fee=9]       ──→   pop min (arrival, -fee, hash)
//! sender C: [n3 t=2]                   push that sender's next nonce
//!
//! result:   C.n3, B.n0, A.n0, A.n1
//! ```

pub mod domain;

pub use domain::entities::MempoolConfig;
pub use domain::errors::MempoolError;
pub use domain::pool::TransactionPool;
pub use domain::value_objects::DrainKey;
