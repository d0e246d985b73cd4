//! # Block Assembler
//!
//! The assembler owns no ledger state. Each tick borrows the account store,
//! the pool and the registry through [`AssemblyContext`], so the caller
//! decides which lock covers the whole tick.

use super::state::AssemblerState;
use crate::config::AssemblyConfig;
use crate::error::AssemblyResult;
use qc_01_account_store::AccountStore;
use qc_03_mempool::TransactionPool;
use qc_04_validator_registry::ValidatorRegistry;
use shared_types::{Address, Block, RejectReason, Timestamp, Transaction};
use std::collections::BTreeSet;
use tracing::{debug, info, trace, warn};

/// Mutable ledger state borrowed for one tick.
pub struct AssemblyContext<'a> {
    pub accounts: &'a mut AccountStore,
    pub mempool: &'a mut TransactionPool,
    pub registry: &'a ValidatorRegistry,
    /// Current chain head, `None` before genesis.
    pub head: Option<&'a Block>,
}

/// Result of one production tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyOutcome {
    /// The chain was empty and genesis was sealed.
    Genesis(Block),
    /// A block was sealed.
    Sealed {
        block: Block,
        /// Included transfers, already marked confirmed.
        confirmed: Vec<Transaction>,
        /// Dropped transfers with their rejection reasons.
        rejected: Vec<Transaction>,
    },
    /// Nothing to seal yet.
    Skipped,
}

impl AssemblyOutcome {
    /// The sealed block, if any.
    #[must_use]
    pub fn block(&self) -> Option<&Block> {
        match self {
            Self::Genesis(block) | Self::Sealed { block, .. } => Some(block),
            Self::Skipped => None,
        }
    }
}

/// Produces blocks from the pool.
#[derive(Debug, Clone)]
pub struct BlockAssembler {
    config: AssemblyConfig,
    state: AssemblerState,
}

impl BlockAssembler {
    pub fn new(config: AssemblyConfig) -> AssemblyResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: AssemblerState::Idle,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Run one production tick at time `now`.
    #[tracing::instrument(
        skip(self, ctx),
        fields(head = ctx.head.map(Block::number), pending = ctx.mempool.size())
    )]
    pub fn produce(&mut self, ctx: AssemblyContext<'_>, now: Timestamp) -> AssemblyOutcome {
        let Some(head) = ctx.head else {
            return self.seal_genesis(ctx.accounts, now);
        };

        let since_head = now.saturating_sub(head.timestamp());
        if ctx.mempool.is_empty() && since_head < self.config.heartbeat_interval_ms {
            trace!(since_head, "[qc-05] Nothing to seal, skipping tick");
            return AssemblyOutcome::Skipped;
        }

        self.transition(AssemblerState::Assembling);

        let number = head.number() + 1;
        let producer = ctx
            .registry
            .select_producer(number, &head.hash)
            .unwrap_or(Address::ZERO);

        let batch = ctx.mempool.drain(self.config.max_transactions_per_block);
        let mut confirmed = Vec::with_capacity(batch.len());
        let mut rejected = Vec::new();
        let mut failed_senders = BTreeSet::new();

        for mut tx in batch {
            if failed_senders.contains(&tx.from) {
                tx.reject(RejectReason::PredecessorRejected);
                rejected.push(tx);
                continue;
            }
            match ctx.accounts.apply_transfer(&tx, &producer) {
                Ok(()) => {
                    tx.confirm(number);
                    confirmed.push(tx);
                }
                Err(err) => {
                    warn!(
                        hash = %tx.hash,
                        from = %tx.from,
                        error = %err,
                        "[qc-05] Transfer no longer applies, excluding from block"
                    );
                    failed_senders.insert(tx.from);
                    tx.reject(err.into());
                    rejected.push(tx);
                }
            }
        }

        // Later nonces from a failed sender can never apply.
        for sender in &failed_senders {
            for mut tx in ctx.mempool.remove_sender(sender) {
                tx.reject(RejectReason::PredecessorRejected);
                rejected.push(tx);
            }
            ctx.accounts.release_reservations(sender);
        }

        let block = Block::seal(
            number,
            now.max(head.timestamp()),
            head.hash,
            producer,
            ctx.accounts.state_root(),
            confirmed.clone(),
        );
        self.transition(AssemblerState::Sealed);

        info!(
            number,
            hash = %block.hash,
            %producer,
            transactions = confirmed.len(),
            rejected = rejected.len(),
            "[qc-05] Block sealed"
        );

        self.transition(AssemblerState::Idle);
        AssemblyOutcome::Sealed {
            block,
            confirmed,
            rejected,
        }
    }

    fn seal_genesis(&mut self, accounts: &AccountStore, now: Timestamp) -> AssemblyOutcome {
        let timestamp = self.config.genesis_timestamp.unwrap_or(now);
        let genesis = Block::genesis(timestamp, accounts.state_root());
        self.transition(AssemblerState::Sealed);
        info!(hash = %genesis.hash, timestamp, "[qc-05] Genesis sealed");
        self.transition(AssemblerState::Idle);
        AssemblyOutcome::Genesis(genesis)
    }

    fn transition(&mut self, next: AssemblerState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal assembler transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "[qc-05] State transition");
        self.state = next;
    }
}
