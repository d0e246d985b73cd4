//! # Contract Deployment Metering
//!
//! Deployment is opaque: nothing is executed. The payload is metered, the fee
//! moves from the deployer to the treasury (the zero address) so total value
//! is unchanged, and the contract gets a deterministic address.
//!
//! ```text
//! gas     = base_gas + gas_per_byte × (code.len() + args.len())
//! fee     = ceil(gas / gas_per_token)
//! address = SHA-256(deployer ‖ code_hash ‖ index)[12..32]
//! ```

use serde::{Deserialize, Serialize};
use shared_types::hashing::Sha256Writer;
use shared_types::{Address, Amount, Hash};

/// Treasury that collects deployment fees.
pub const TREASURY: Address = Address::ZERO;

/// Gas schedule for deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    pub base_gas: u64,
    pub gas_per_byte: u64,
    /// Gas bought by one unit of balance. Must be non-zero.
    pub gas_per_token: u64,
    /// Largest accepted `code + args` payload.
    pub max_payload_bytes: usize,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            base_gas: 500_000,
            gas_per_byte: 2_000,
            gas_per_token: 100_000,
            max_payload_bytes: 24 * 1024,
        }
    }
}

impl ContractConfig {
    /// Gas charged for a payload of `payload_len` bytes.
    #[must_use]
    pub fn gas_for(&self, payload_len: usize) -> u64 {
        self.gas_per_byte
            .saturating_mul(payload_len as u64)
            .saturating_add(self.base_gas)
    }

    /// Fee in balance units, rounded up.
    #[must_use]
    pub fn fee_for(&self, gas: u64) -> Amount {
        let per_token = self.gas_per_token.max(1);
        Amount::from(gas.div_ceil(per_token))
    }
}

/// SHA-256 of the contract code.
#[must_use]
pub fn code_hash(code: &[u8]) -> Hash {
    Sha256Writer::new().bytes(code).finish()
}

/// Address of the `index`-th deployment.
#[must_use]
pub fn contract_address(deployer: &Address, code_hash: &Hash, index: u64) -> Address {
    let digest = Sha256Writer::new()
        .bytes(deployer.as_bytes())
        .bytes(code_hash.as_bytes())
        .u64(index)
        .finish();
    let mut out = [0u8; Address::LEN];
    out.copy_from_slice(&digest.as_bytes()[32 - Address::LEN..]);
    Address(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_and_fee() {
        let config = ContractConfig::default();
        assert_eq!(config.gas_for(0), 500_000);
        assert_eq!(config.gas_for(1_000), 2_500_000);
        assert_eq!(config.fee_for(500_000), 5);
        // Partial tokens round up
        assert_eq!(config.fee_for(500_001), 6);
    }

    #[test]
    fn test_zero_gas_per_token_does_not_panic() {
        let config = ContractConfig {
            gas_per_token: 0,
            ..ContractConfig::default()
        };
        assert_eq!(config.fee_for(7), 7);
    }

    #[test]
    fn test_address_depends_on_index() {
        let deployer = Address([1; 20]);
        let hash = code_hash(b"contract Token {}");
        let first = contract_address(&deployer, &hash, 0);
        assert_eq!(first, contract_address(&deployer, &hash, 0));
        assert_ne!(first, contract_address(&deployer, &hash, 1));
        assert_ne!(first, contract_address(&Address([2; 20]), &hash, 0));
    }
}
