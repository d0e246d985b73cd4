//! Validation domain layer.

pub mod entities;
pub mod validator;
