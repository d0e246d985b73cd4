//! # Validator Registry
//!
//! Validators are kept in registration order; ids are never reused, and an
//! unstaked validator stays listed as inactive until the list reaches
//! `max_validators`, at which point the oldest inactive entry is dropped to
//! make room.

use super::errors::{RegistryError, RegistryResult};
use qc_01_account_store::AccountStore;
use shared_types::hashing::Sha256Writer;
use shared_types::{Address, Amount, BlockNumber, Hash, Timestamp, Validator};
use tracing::{debug, info};

/// Minimum stake required to register.
pub const MINIMUM_STAKE: Amount = 32;

/// Default bound on the validator list, active and inactive together.
pub const MAX_VALIDATORS: usize = 1000;

/// Stake-weighted validator set.
#[derive(Debug, Clone)]
pub struct ValidatorRegistry {
    validators: Vec<Validator>,
    minimum_stake: Amount,
    max_validators: usize,
    next_id: u64,
}

impl ValidatorRegistry {
    #[must_use]
    pub fn new(minimum_stake: Amount) -> Self {
        Self {
            validators: Vec::new(),
            minimum_stake,
            max_validators: MAX_VALIDATORS,
            next_id: 1,
        }
    }

    /// Bound the validator list. At least one slot is always kept.
    #[must_use]
    pub fn with_max_validators(mut self, max_validators: usize) -> Self {
        self.max_validators = max_validators.max(1);
        self
    }

    /// Rebuild from a snapshot, keeping ids and order.
    #[must_use]
    pub fn from_validators(validators: Vec<Validator>, minimum_stake: Amount) -> Self {
        let next_id = validators.iter().map(|v| v.id).max().unwrap_or(0) + 1;
        Self {
            validators,
            minimum_stake,
            max_validators: MAX_VALIDATORS,
            next_id,
        }
    }

    #[must_use]
    pub fn minimum_stake(&self) -> Amount {
        self.minimum_stake
    }

    #[must_use]
    pub fn max_validators(&self) -> usize {
        self.max_validators
    }

    /// Stake `stake` from `address` and add it to the active set.
    ///
    /// `available` is the account's balance minus pending debits. The debit
    /// and the insertion happen together or not at all.
    pub fn register(
        &mut self,
        address: Address,
        stake: Amount,
        available: Amount,
        accounts: &mut AccountStore,
        now: Timestamp,
    ) -> RegistryResult<Validator> {
        if stake < self.minimum_stake {
            return Err(RegistryError::StakeTooLow {
                stake,
                minimum: self.minimum_stake,
            });
        }
        if self.get(&address).is_some() {
            return Err(RegistryError::AlreadyRegistered(address));
        }
        if self.active_count() >= self.max_validators {
            return Err(RegistryError::ValidatorSetFull {
                max: self.max_validators,
            });
        }
        if available < stake {
            return Err(RegistryError::InsufficientFunds {
                available,
                required: stake,
            });
        }

        self.insert(address, stake, accounts, now)
    }

    /// Re-apply a registration accepted earlier, when rebuilding the set from
    /// history. Stake and set-size policy are not checked again; the debit
    /// still is.
    pub fn replay_registration(
        &mut self,
        address: Address,
        stake: Amount,
        accounts: &mut AccountStore,
        joined_at: Timestamp,
    ) -> RegistryResult<Validator> {
        if self.get(&address).is_some() {
            return Err(RegistryError::AlreadyRegistered(address));
        }
        self.insert(address, stake, accounts, joined_at)
    }

    fn insert(
        &mut self,
        address: Address,
        stake: Amount,
        accounts: &mut AccountStore,
        now: Timestamp,
    ) -> RegistryResult<Validator> {
        accounts.debit(address, stake)?;
        self.compact_history();

        let validator = Validator {
            id: self.next_id,
            address,
            stake,
            active: true,
            joined_at: now,
        };
        self.next_id += 1;
        self.validators.push(validator.clone());

        info!(
            id = validator.id,
            %address,
            stake,
            "[qc-04] Validator registered"
        );
        Ok(validator)
    }

    /// Deactivate `address` and refund its stake.
    pub fn unstake(
        &mut self,
        address: &Address,
        accounts: &mut AccountStore,
    ) -> RegistryResult<Validator> {
        let index = self
            .validators
            .iter()
            .position(|v| v.active && v.address == *address)
            .ok_or(RegistryError::UnknownValidator(*address))?;

        accounts.credit(*address, self.validators[index].stake)?;
        let validator = &mut self.validators[index];
        validator.active = false;

        info!(id = validator.id, %address, stake = validator.stake, "[qc-04] Validator unstaked");
        Ok(validator.clone())
    }

    /// Drop the oldest inactive entries until one more validator fits.
    fn compact_history(&mut self) {
        while self.validators.len() >= self.max_validators {
            let Some(index) = self.validators.iter().position(|v| !v.active) else {
                break;
            };
            let dropped = self.validators.remove(index);
            debug!(
                id = dropped.id,
                address = %dropped.address,
                "[qc-04] Inactive validator dropped from history"
            );
        }
    }

    /// Deterministic stake-weighted producer for `block_number`.
    ///
    /// `None` when no validator is active.
    #[must_use]
    pub fn select_producer(
        &self,
        block_number: BlockNumber,
        previous_hash: &Hash,
    ) -> Option<Address> {
        let total = self.total_active_stake();
        if total == 0 {
            return None;
        }

        let seed = Sha256Writer::new()
            .bytes(previous_hash.as_bytes())
            .u64(block_number)
            .finish();
        let mut head = [0u8; 16];
        head.copy_from_slice(&seed.as_bytes()[..16]);
        let draw = u128::from_be_bytes(head) % total;

        let mut cumulative: Amount = 0;
        for validator in self.list_active() {
            cumulative = cumulative.saturating_add(validator.stake);
            if cumulative > draw {
                debug!(
                    block_number,
                    producer = %validator.address,
                    "[qc-04] Producer selected"
                );
                return Some(validator.address);
            }
        }
        // Unreachable while total > 0; fall back to the last active validator.
        self.list_active().last().map(|v| v.address)
    }

    /// Active validators in registration order.
    pub fn list_active(&self) -> impl DoubleEndedIterator<Item = &Validator> + '_ {
        self.validators.iter().filter(|v| v.active)
    }

    /// Every validator ever registered, including inactive ones.
    #[must_use]
    pub fn list_all(&self) -> &[Validator] {
        &self.validators
    }

    /// The active validator for `address`.
    #[must_use]
    pub fn get(&self, address: &Address) -> Option<&Validator> {
        self.list_active().find(|v| v.address == *address)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.list_active().count()
    }

    /// Sum of active stakes. Locked value for conservation checks.
    #[must_use]
    pub fn total_active_stake(&self) -> Amount {
        self.list_active()
            .fold(0, |acc: Amount, v| acc.saturating_add(v.stake))
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new(MINIMUM_STAKE)
    }
}
