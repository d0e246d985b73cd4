//! # Account Store
//!
//! Balances, confirmed nonces and reservation high-water marks, keyed by
//! address in a `BTreeMap` so iteration order is the canonical state order.
//!
//! ## Nonce Reservation
//!
//! ```text
//!   confirmed (nonce)          reserved
//!        │                        │
//!   0 ── 1 ── 2 ── 3 ── 4 ── 5 ── 6
//!        └── sealed ──┘└ pending ┘
//! ```
//!
//! Admission reserves the next nonce; sealing confirms it. When a pending
//! transaction is dropped, every later reservation from that sender is dropped
//! with it, so releasing rewinds the mark to the confirmed nonce.

use super::errors::{StateError, StateResult};
use shared_types::hashing::state_root;
use shared_types::{Account, Address, Amount, Hash, Nonce, Transaction};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct AccountRecord {
    balance: Amount,
    nonce: Nonce,
    reserved: Nonce,
}

impl AccountRecord {
    fn deposit(&mut self, address: Address, amount: Amount) -> StateResult<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(StateError::BalanceOverflow(address))?;
        Ok(())
    }

    fn withdraw(&mut self, address: Address, amount: Amount) -> StateResult<()> {
        if self.balance < amount {
            return Err(StateError::InsufficientFunds {
                address,
                available: self.balance,
                required: amount,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    fn advance_nonce(&mut self) {
        self.nonce += 1;
        self.reserved = self.reserved.max(self.nonce);
    }

    fn view(&self, address: Address) -> Account {
        Account {
            address,
            balance: self.balance,
            nonce: self.nonce,
        }
    }
}

/// Authoritative account state.
#[derive(Debug, Clone, Default)]
pub struct AccountStore {
    accounts: BTreeMap<Address, AccountRecord>,
}

impl AccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a snapshot. No reservations survive a restore.
    #[must_use]
    pub fn from_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|a| {
                (
                    a.address,
                    AccountRecord {
                        balance: a.balance,
                        nonce: a.nonce,
                        reserved: a.nonce,
                    },
                )
            })
            .collect();
        Self { accounts }
    }

    /// Current view of `address`; a zero account if it was never created.
    #[must_use]
    pub fn get(&self, address: &Address) -> Account {
        self.accounts
            .get(address)
            .map(|r| r.view(*address))
            .unwrap_or_else(|| Account::empty(*address))
    }

    #[must_use]
    pub fn exists(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Create an account explicitly, possibly with a zero balance.
    pub fn open(&mut self, address: Address, initial_balance: Amount) -> StateResult<Account> {
        if self.accounts.contains_key(&address) {
            return Err(StateError::AccountExists(address));
        }
        let record = AccountRecord {
            balance: initial_balance,
            ..AccountRecord::default()
        };
        self.accounts.insert(address, record);
        debug!(%address, balance = initial_balance, "[qc-01] Account opened");
        Ok(record.view(address))
    }

    /// Add `amount` to `address`, creating the account if absent.
    ///
    /// Returns the new balance.
    pub fn credit(&mut self, address: Address, amount: Amount) -> StateResult<Amount> {
        if amount == 0 {
            return Err(StateError::ZeroAmount);
        }
        let mut record = self.accounts.get(&address).copied().unwrap_or_default();
        record.deposit(address, amount)?;
        self.accounts.insert(address, record);
        Ok(record.balance)
    }

    /// Remove `amount` from `address`.
    ///
    /// Returns the new balance.
    pub fn debit(&mut self, address: Address, amount: Amount) -> StateResult<Amount> {
        if amount == 0 {
            return Err(StateError::ZeroAmount);
        }
        let Some(record) = self.accounts.get_mut(&address) else {
            return Err(StateError::InsufficientFunds {
                address,
                available: 0,
                required: amount,
            });
        };
        record.withdraw(address, amount)?;
        Ok(record.balance)
    }

    /// Nonce the next admitted transaction from `address` must carry.
    #[must_use]
    pub fn next_nonce(&self, address: &Address) -> Nonce {
        self.accounts.get(address).map_or(0, |r| r.reserved)
    }

    /// Number of nonces reserved but not yet confirmed.
    #[must_use]
    pub fn reserved_count(&self, address: &Address) -> u64 {
        self.accounts
            .get(address)
            .map_or(0, |r| r.reserved.saturating_sub(r.nonce))
    }

    /// Reserve the next nonce for an admitted transaction.
    pub fn reserve_nonce(&mut self, address: &Address) -> StateResult<Nonce> {
        let record = self
            .accounts
            .get_mut(address)
            .ok_or(StateError::UnknownAccount(*address))?;
        let nonce = record.reserved;
        record.reserved += 1;
        Ok(nonce)
    }

    /// Mark `nonce` as used. It must be the account's next confirmed nonce.
    pub fn confirm_nonce(&mut self, address: &Address, nonce: Nonce) -> StateResult<()> {
        let record = self
            .accounts
            .get_mut(address)
            .ok_or(StateError::UnknownAccount(*address))?;
        if record.nonce != nonce {
            return Err(StateError::NonceOutOfOrder {
                address: *address,
                expected: record.nonce,
                got: nonce,
            });
        }
        record.advance_nonce();
        Ok(())
    }

    /// Rewind outstanding reservations to the confirmed nonce.
    ///
    /// Returns how many reservations were released.
    pub fn release_reservations(&mut self, address: &Address) -> u64 {
        let Some(record) = self.accounts.get_mut(address) else {
            return 0;
        };
        let released = record.reserved.saturating_sub(record.nonce);
        record.reserved = record.nonce;
        if released > 0 {
            debug!(%address, released, "[qc-01] Nonce reservations released");
        }
        released
    }

    /// Apply a transfer atomically.
    ///
    /// Debits `amount + fee` from the sender, credits `amount` to the
    /// recipient, credits `fee` to `producer`, and confirms the sender's nonce.
    /// Nothing is written unless every step succeeds.
    pub fn apply_transfer(&mut self, tx: &Transaction, producer: &Address) -> StateResult<()> {
        if tx.amount == 0 {
            return Err(StateError::ZeroAmount);
        }
        let sender = self
            .accounts
            .get(&tx.from)
            .ok_or(StateError::UnknownAccount(tx.from))?;
        if sender.nonce != tx.nonce {
            return Err(StateError::NonceOutOfOrder {
                address: tx.from,
                expected: sender.nonce,
                got: tx.nonce,
            });
        }
        let total = tx
            .total_debit()
            .ok_or(StateError::BalanceOverflow(tx.from))?;

        let mut staged: BTreeMap<Address, AccountRecord> = BTreeMap::new();
        stage(&self.accounts, &mut staged, tx.from).withdraw(tx.from, total)?;
        stage(&self.accounts, &mut staged, tx.to).deposit(tx.to, tx.amount)?;
        if tx.fee > 0 {
            stage(&self.accounts, &mut staged, *producer).deposit(*producer, tx.fee)?;
        }
        stage(&self.accounts, &mut staged, tx.from).advance_nonce();

        self.accounts.extend(staged);
        debug!(
            hash = %tx.hash,
            from = %tx.from,
            to = %tx.to,
            amount = tx.amount,
            fee = tx.fee,
            "[qc-01] Transfer applied"
        );
        Ok(())
    }

    /// Move `amount` from `from` to `to` without touching nonces.
    ///
    /// Both writes are staged; a failed credit leaves the sender untouched.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> StateResult<()> {
        if amount == 0 {
            return Err(StateError::ZeroAmount);
        }
        if !self.accounts.contains_key(&from) {
            return Err(StateError::InsufficientFunds {
                address: from,
                available: 0,
                required: amount,
            });
        }
        let mut staged: BTreeMap<Address, AccountRecord> = BTreeMap::new();
        stage(&self.accounts, &mut staged, from).withdraw(from, amount)?;
        stage(&self.accounts, &mut staged, to).deposit(to, amount)?;
        self.accounts.extend(staged);
        Ok(())
    }

    /// All accounts in address order.
    pub fn accounts(&self) -> impl Iterator<Item = Account> + '_ {
        self.accounts.iter().map(|(address, r)| r.view(*address))
    }

    /// Commitment over `(address, balance, nonce)` of every account.
    #[must_use]
    pub fn state_root(&self) -> Hash {
        let views: Vec<Account> = self.accounts().collect();
        state_root(views.iter())
    }

    /// Sum of all balances.
    #[must_use]
    pub fn total_balance(&self) -> Amount {
        self.accounts
            .values()
            .fold(0, |acc: Amount, r| acc.saturating_add(r.balance))
    }
}

fn stage<'a>(
    accounts: &BTreeMap<Address, AccountRecord>,
    staged: &'a mut BTreeMap<Address, AccountRecord>,
    address: Address,
) -> &'a mut AccountRecord {
    staged
        .entry(address)
        .or_insert_with(|| accounts.get(&address).copied().unwrap_or_default())
}
