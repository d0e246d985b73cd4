//! Registry domain layer.

pub mod errors;
pub mod registry;
