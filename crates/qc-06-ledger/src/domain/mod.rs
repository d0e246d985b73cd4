//! Domain layer for the ledger facade.

pub mod chain;
pub mod contracts;
pub mod journal;
pub mod snapshot;
pub mod state;
pub mod views;
