//! Ordering key used when draining the pool.

use shared_types::{Address, Amount, Hash, Timestamp};
use std::cmp::Ordering;

/// Position of a sender's head transaction in the drain order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrainKey {
    /// Admission time (earlier first).
    pub arrival: Timestamp,
    /// Fee (higher first on equal arrival).
    pub fee: Amount,
    /// Deterministic tie-breaker.
    pub hash: Hash,
    pub sender: Address,
}

impl Ord for DrainKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.arrival
            .cmp(&other.arrival)
            // Higher fee = earlier (so reverse comparison)
            .then_with(|| other.fee.cmp(&self.fee))
            .then_with(|| self.hash.cmp(&other.hash))
            .then_with(|| self.sender.cmp(&other.sender))
    }
}

impl PartialOrd for DrainKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(arrival: u64, fee: u128, hash: u8) -> DrainKey {
        DrainKey {
            arrival,
            fee,
            hash: Hash([hash; 32]),
            sender: Address::ZERO,
        }
    }

    #[test]
    fn test_earlier_arrival_first() {
        assert!(key(1, 0, 9) < key(2, 100, 0));
    }

    #[test]
    fn test_higher_fee_breaks_arrival_tie() {
        assert!(key(5, 10, 9) < key(5, 1, 0));
    }

    #[test]
    fn test_hash_breaks_remaining_tie() {
        assert!(key(5, 1, 1) < key(5, 1, 2));
    }
}
