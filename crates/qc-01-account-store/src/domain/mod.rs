//! Account store domain layer.

pub mod errors;
pub mod store;
