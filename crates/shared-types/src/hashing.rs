//! # Canonical Hashing
//!
//! All commitments are SHA-256 over explicit field encodings:
//!
//! | Commitment          | Preimage                                                    |
//! |---------------------|-------------------------------------------------------------|
//! | transaction hash    | `from ‖ to ‖ amount ‖ nonce ‖ fee`                          |
//! | transactions root   | binary Merkle tree over transaction hashes, odd node promoted |
//! | state root          | `(address ‖ balance ‖ nonce)*` sorted by address           |
//! | block hash          | `number ‖ timestamp ‖ previous ‖ producer ‖ state ‖ txroot` |
//!
//! Integers are big-endian. An empty tree or empty state hashes to [`Hash::ZERO`].

use crate::entities::{Account, Hash};
use sha2::{Digest, Sha256};

/// Builder-style SHA-256 writer for field-by-field encodings.
#[derive(Default)]
pub struct Sha256Writer {
    hasher: Sha256,
}

impl Sha256Writer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.hasher.update(data);
        self
    }

    #[must_use]
    pub fn u64(self, value: u64) -> Self {
        self.bytes(&value.to_be_bytes())
    }

    #[must_use]
    pub fn u128(self, value: u128) -> Self {
        self.bytes(&value.to_be_bytes())
    }

    #[must_use]
    pub fn finish(self) -> Hash {
        Hash(self.hasher.finalize().into())
    }
}

/// Binary Merkle root.
///
/// The last node of an odd level moves up unchanged, so `[a, b, c]` and
/// `[a, b, c, c]` commit to different roots.
#[must_use]
pub fn merkle_root(hashes: &[Hash]) -> Hash {
    let mut level = hashes.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair.get(1) {
                Some(right) => Sha256Writer::new()
                    .bytes(pair[0].as_bytes())
                    .bytes(right.as_bytes())
                    .finish(),
                None => pair[0],
            })
            .collect();
    }
    level.first().copied().unwrap_or(Hash::ZERO)
}

/// Commitment over account state.
///
/// Callers must supply accounts in ascending address order; the account store
/// keeps them in a `BTreeMap` so its iteration order already qualifies.
#[must_use]
pub fn state_root<'a>(accounts: impl IntoIterator<Item = &'a Account>) -> Hash {
    let mut writer = Sha256Writer::new();
    let mut any = false;
    for account in accounts {
        any = true;
        writer = writer
            .bytes(account.address.as_bytes())
            .u128(account.balance)
            .u64(account.nonce);
    }
    if any {
        writer.finish()
    } else {
        Hash::ZERO
    }
}
