//! Authenticator implementations.

pub mod ed25519;
