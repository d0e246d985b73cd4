//! Domain layer for block assembly.

pub mod assembler;
pub mod state;
