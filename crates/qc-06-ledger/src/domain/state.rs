//! # Ledger State
//!
//! Every mutable component, owned once and guarded by the facade's single
//! writer mutex. Nothing in here locks.

use super::journal::{self, JournalRecord, ValueEntry};
use super::snapshot::LedgerSnapshot;
use super::views::AccountSummary;
use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use qc_01_account_store::AccountStore;
use qc_02_tx_validation::PendingContext;
use qc_03_mempool::TransactionPool;
use qc_04_validator_registry::ValidatorRegistry;
use qc_05_block_assembly::BlockAssembler;
use shared_types::{
    Address, Amount, BlockNumber, ContractDeployment, Hash, PublicKey, Transaction, TxStatus,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::info;

pub(crate) struct LedgerState {
    pub accounts: AccountStore,
    pub mempool: TransactionPool,
    pub registry: ValidatorRegistry,
    pub assembler: BlockAssembler,
    /// Latest record of every admitted transaction.
    pub transactions: HashMap<Hash, Transaction>,
    /// Submission order of `transactions`.
    pub transaction_order: Vec<Hash>,
    pub keys: BTreeMap<Address, PublicKey>,
    pub contracts: Vec<ContractDeployment>,
    pub total_issued: Amount,
    /// Every value change outside sealed transfers, oldest first.
    pub journal: Vec<JournalRecord>,
}

impl LedgerState {
    /// Fresh state with the configured genesis allocations credited.
    pub fn new(config: &LedgerConfig) -> LedgerResult<Self> {
        let mut accounts = AccountStore::new();
        let mut journal = Vec::new();
        for allocation in &config.genesis_allocations {
            if allocation.amount > 0 {
                accounts.credit(allocation.address, allocation.amount)?;
                journal.push(JournalRecord {
                    height: 0,
                    entry: ValueEntry::Allocated {
                        address: allocation.address,
                        amount: allocation.amount,
                    },
                });
            }
        }
        let total_issued = config.genesis_supply();
        if !config.genesis_allocations.is_empty() {
            info!(
                accounts = accounts.len(),
                total_issued, "[qc-06] Genesis allocations credited"
            );
        }

        Ok(Self {
            accounts,
            mempool: TransactionPool::new(config.mempool.clone()),
            registry: registry_for(config),
            assembler: BlockAssembler::new(config.assembly.clone())?,
            transactions: HashMap::new(),
            transaction_order: Vec::new(),
            keys: BTreeMap::new(),
            contracts: Vec::new(),
            total_issued,
            journal,
        })
    }

    /// Rebuild from a snapshot whose chain already passed verification.
    ///
    /// Accounts, the validator set and the issued supply are replayed from
    /// the chain and the journal; the snapshot's copies must match the
    /// replay exactly. Pending transactions are re-admitted and their nonces
    /// reserved again.
    pub fn restore(config: &LedgerConfig, snapshot: &LedgerSnapshot) -> LedgerResult<Self> {
        let height = snapshot.height();
        let replayed = journal::replay(&snapshot.blocks, &snapshot.journal, registry_for(config))?;
        let mismatch = |what: &str| {
            LedgerError::corrupted(height, format!("{what} does not match replayed history"))
        };

        if !replayed.accounts.accounts().eq(snapshot.accounts.iter().copied()) {
            return Err(mismatch("account state"));
        }
        if replayed.total_issued != snapshot.total_issued {
            return Err(mismatch("issued supply"));
        }
        if !replayed
            .registry
            .list_active()
            .eq(snapshot.validators.iter().filter(|v| v.active))
        {
            return Err(mismatch("active validator set"));
        }
        let keyed: BTreeSet<Address> = snapshot.keys.iter().map(|(address, _)| *address).collect();
        if keyed != replayed.wallets || keyed.len() != snapshot.keys.len() {
            return Err(mismatch("wallet registry"));
        }
        if !snapshot
            .contracts
            .iter()
            .map(|c| (c.deployer, c.fee))
            .eq(replayed.contract_fees.iter().copied())
        {
            return Err(mismatch("contract list"));
        }

        let mut state = Self {
            accounts: replayed.accounts,
            mempool: TransactionPool::new(config.mempool.clone()),
            registry: replayed.registry,
            assembler: BlockAssembler::new(config.assembly.clone())?,
            transactions: HashMap::with_capacity(snapshot.transactions.len()),
            transaction_order: Vec::with_capacity(snapshot.transactions.len()),
            keys: snapshot.keys.iter().copied().collect(),
            contracts: snapshot.contracts.clone(),
            total_issued: replayed.total_issued,
            journal: snapshot.journal.clone(),
        };

        let sealed: HashMap<Hash, BlockNumber> = snapshot
            .blocks
            .iter()
            .flat_map(|b| b.transactions.iter().map(move |tx| (tx.hash, b.number())))
            .collect();
        for tx in &snapshot.transactions {
            if tx.status == TxStatus::Confirmed && tx.block_number != sealed.get(&tx.hash).copied() {
                return Err(LedgerError::corrupted(
                    height,
                    format!("confirmed transaction {} is not in its block", tx.hash),
                ));
            }
            state.record(tx.clone());
        }

        for tx in &snapshot.pending {
            let expected = state.accounts.next_nonce(&tx.from);
            if tx.nonce != expected || tx.compute_hash() != tx.hash {
                return Err(LedgerError::corrupted(
                    height,
                    format!("pending transaction {} does not follow account state", tx.hash),
                ));
            }
            state
                .mempool
                .admit(tx.clone())
                .map_err(|err| LedgerError::corrupted(height, err.to_string()))?;
            state.accounts.reserve_nonce(&tx.from)?;
            if state.mempool.pending_debits(&tx.from) > state.accounts.get(&tx.from).balance {
                return Err(LedgerError::corrupted(
                    height,
                    format!("pending debits of {} exceed its balance", tx.from),
                ));
            }
        }

        Ok(state)
    }

    /// Append a journal entry at chain height `height`.
    pub fn record_value(&mut self, height: BlockNumber, entry: ValueEntry) {
        self.journal.push(JournalRecord { height, entry });
    }

    /// Insert or update the history entry for `tx`.
    pub fn record(&mut self, tx: Transaction) {
        let hash = tx.hash;
        if self.transactions.insert(hash, tx).is_none() {
            self.transaction_order.push(hash);
        }
    }

    pub fn pending_context(&self, address: &Address) -> PendingContext {
        PendingContext {
            count: self.mempool.pending_count(address),
            debits: self.mempool.pending_debits(address),
        }
    }

    pub fn available_balance(&self, address: &Address) -> Amount {
        self.accounts
            .get(address)
            .balance
            .saturating_sub(self.mempool.pending_debits(address))
    }

    pub fn summary(&self, address: &Address) -> Option<AccountSummary> {
        if !self.accounts.exists(address) {
            return None;
        }
        let account = self.accounts.get(address);
        Some(AccountSummary {
            address: *address,
            balance: account.balance,
            available_balance: self.available_balance(address),
            nonce: account.nonce,
            next_nonce: self.accounts.next_nonce(address),
            pending_transactions: self.mempool.pending_count(address),
        })
    }

    /// Σ balances + Σ active stakes.
    pub fn accounted_value(&self) -> Amount {
        self.accounts
            .total_balance()
            .saturating_add(self.registry.total_active_stake())
    }

    /// Most recent first.
    pub fn recent_transactions(&self, limit: usize) -> Vec<Transaction> {
        self.transaction_order
            .iter()
            .rev()
            .filter_map(|hash| self.transactions.get(hash))
            .take(limit)
            .cloned()
            .collect()
    }

    /// History in submission order.
    pub fn transaction_history(&self) -> Vec<Transaction> {
        self.transaction_order
            .iter()
            .filter_map(|hash| self.transactions.get(hash))
            .cloned()
            .collect()
    }
}

fn registry_for(config: &LedgerConfig) -> ValidatorRegistry {
    ValidatorRegistry::new(config.minimum_stake).with_max_validators(config.max_validators)
}
