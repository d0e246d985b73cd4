//! # Transaction Pool
//!
//! ## Data Structures
//!
//! - `by_hash`: O(1) lookup by transaction hash
//! - `by_sender`: O(log n) nonce-ordered transactions per account
//!
//! Drain order is computed on demand with a heap over sender heads, so there
//! is no separate priority index to keep in sync.

use super::entities::MempoolConfig;
use super::errors::MempoolError;
use super::value_objects::DrainKey;
use shared_types::{Address, Amount, Hash, Nonce, Transaction};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use tracing::{debug, trace};

/// Pending transaction pool.
#[derive(Debug)]
pub struct TransactionPool {
    /// Configuration.
    config: MempoolConfig,

    /// All transactions indexed by hash.
    by_hash: HashMap<Hash, Transaction>,

    /// Transactions grouped by sender, ordered by nonce.
    by_sender: BTreeMap<Address, BTreeMap<Nonce, Hash>>,
}

impl TransactionPool {
    /// Creates a new empty transaction pool.
    #[must_use]
    pub fn new(config: MempoolConfig) -> Self {
        Self {
            config,
            by_hash: HashMap::new(),
            by_sender: BTreeMap::new(),
        }
    }

    /// Creates a pool with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(MempoolConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &MempoolConfig {
        &self.config
    }

    /// Number of pending transactions.
    #[must_use]
    pub fn size(&self) -> usize {
        self.by_hash.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    #[must_use]
    pub fn get(&self, hash: &Hash) -> Option<&Transaction> {
        self.by_hash.get(hash)
    }

    #[must_use]
    pub fn contains(&self, hash: &Hash) -> bool {
        self.by_hash.contains_key(hash)
    }

    /// Pending transactions from `sender`.
    #[must_use]
    pub fn pending_count(&self, sender: &Address) -> u64 {
        self.by_sender.get(sender).map_or(0, |q| q.len() as u64)
    }

    /// Sum of `amount + fee` over `sender`'s pending transactions.
    #[must_use]
    pub fn pending_debits(&self, sender: &Address) -> Amount {
        self.sender_transactions(sender)
            .fold(0, |acc: Amount, tx| {
                acc.saturating_add(tx.total_debit().unwrap_or(Amount::MAX))
            })
    }

    /// `sender`'s pending transactions in nonce order.
    pub fn sender_transactions<'a>(
        &'a self,
        sender: &Address,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.by_sender
            .get(sender)
            .into_iter()
            .flat_map(|q| q.values())
            .filter_map(|hash| self.by_hash.get(hash))
    }

    /// Admit a transaction.
    ///
    /// # Errors
    /// - `DuplicateTransaction` if the hash is already pending
    /// - `NonceGap` if the nonce does not directly follow the sender's last
    ///   pending nonce
    /// - `PoolFull` at capacity; existing entries are never evicted
    pub fn admit(&mut self, tx: Transaction) -> Result<(), MempoolError> {
        if self.by_hash.contains_key(&tx.hash) {
            return Err(MempoolError::DuplicateTransaction(tx.hash));
        }

        if let Some(last) = self
            .by_sender
            .get(&tx.from)
            .and_then(|q| q.keys().next_back().copied())
        {
            if tx.nonce != last + 1 {
                return Err(MempoolError::NonceGap {
                    sender: tx.from,
                    expected: last + 1,
                    actual: tx.nonce,
                });
            }
        }

        if self.by_hash.len() >= self.config.max_transactions {
            debug!(
                capacity = self.config.max_transactions,
                hash = %tx.hash,
                "[qc-03] Pool full, rejecting new transaction"
            );
            return Err(MempoolError::PoolFull {
                capacity: self.config.max_transactions,
            });
        }

        self.by_sender
            .entry(tx.from)
            .or_default()
            .insert(tx.nonce, tx.hash);
        trace!(hash = %tx.hash, from = %tx.from, nonce = tx.nonce, "[qc-03] Transaction admitted");
        self.by_hash.insert(tx.hash, tx);
        Ok(())
    }

    /// Hashes of up to `max_count` transactions in drain order, without
    /// removing them.
    #[must_use]
    pub fn select(&self, max_count: usize) -> Vec<Hash> {
        let mut queues: BTreeMap<Address, _> = self
            .by_sender
            .iter()
            .map(|(sender, queue)| (*sender, queue.values()))
            .collect();

        let mut heads = BinaryHeap::new();
        for (sender, queue) in queues.iter_mut() {
            if let Some(key) = queue.next().and_then(|h| self.drain_key(h, *sender)) {
                heads.push(Reverse(key));
            }
        }

        let mut selected = Vec::with_capacity(max_count.min(self.by_hash.len()));
        while selected.len() < max_count {
            let Some(Reverse(key)) = heads.pop() else {
                break;
            };
            selected.push(key.hash);
            if let Some(next) = queues
                .get_mut(&key.sender)
                .and_then(Iterator::next)
                .and_then(|h| self.drain_key(h, key.sender))
            {
                heads.push(Reverse(next));
            }
        }
        selected
    }

    /// Remove and return up to `max_count` transactions in drain order.
    ///
    /// Per-sender nonce order is always honoured: a sender's transaction is
    /// only taken after every lower-nonce transaction from that sender.
    pub fn drain(&mut self, max_count: usize) -> Vec<Transaction> {
        let drained: Vec<Transaction> = self
            .select(max_count)
            .into_iter()
            .filter_map(|hash| self.remove(&hash).ok())
            .collect();
        if !drained.is_empty() {
            debug!(
                drained = drained.len(),
                remaining = self.by_hash.len(),
                "[qc-03] Drained transactions"
            );
        }
        drained
    }

    /// Remove one transaction by hash.
    pub fn remove(&mut self, hash: &Hash) -> Result<Transaction, MempoolError> {
        let tx = self
            .by_hash
            .remove(hash)
            .ok_or(MempoolError::TransactionNotFound(*hash))?;

        if let Some(queue) = self.by_sender.get_mut(&tx.from) {
            queue.remove(&tx.nonce);
            if queue.is_empty() {
                self.by_sender.remove(&tx.from);
            }
        }
        Ok(tx)
    }

    /// Remove every pending transaction from `sender`, in nonce order.
    pub fn remove_sender(&mut self, sender: &Address) -> Vec<Transaction> {
        let Some(queue) = self.by_sender.remove(sender) else {
            return Vec::new();
        };
        queue
            .values()
            .filter_map(|hash| self.by_hash.remove(hash))
            .collect()
    }

    /// Every pending transaction in drain order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.select(self.by_hash.len())
            .iter()
            .filter_map(|hash| self.by_hash.get(hash).cloned())
            .collect()
    }

    fn drain_key(&self, hash: &Hash, sender: Address) -> Option<DrainKey> {
        self.by_hash.get(hash).map(|tx| DrainKey {
            arrival: tx.submitted_at,
            fee: tx.fee,
            hash: tx.hash,
            sender,
        })
    }
}

impl Default for TransactionPool {
    fn default() -> Self {
        Self::with_defaults()
    }
}
