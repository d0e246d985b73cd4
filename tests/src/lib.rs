//! # Quantum-Chain Test Suite
//!
//! Cross-crate tests that exercise the ledger the way the node runs it.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── ledger_flows.rs   # admission → mempool → sealing → events
//! │   ├── api_flows.rs      # REST/WS surface over a real socket
//! │   ├── runtime_flows.rs  # boot, persist, restore
//! │   └── properties.rs     # proptest invariants over random workloads
//! └── benches/
//!     └── ledger_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p qc-tests
//! cargo test -p qc-tests integration::properties
//! cargo bench -p qc-tests
//! ```

pub mod integration;
