//! Mempool domain layer.

pub mod entities;
pub mod errors;
pub mod pool;
pub mod value_objects;
