//! # Ledger Service
//!
//! The facade every adapter talks to.
//!
//! ## Locking
//!
//! ```text
//! lifecycle ──→ state ──→ chain (write)
//!                 │
//!                 └─────→ chain (read)
//! ```
//!
//! - `state` is the single writer mutex: admission, staking, deployment and
//!   block production all run under it, so a block is never applied while a
//!   submission is half-checked.
//! - `chain` is appended only while `state` is held; head and block lookups
//!   take only the read lock and never wait on a submission.
//! - Events are published while `state` is held, so every subscriber sees
//!   them in mutation order. Publishing never blocks.

use crate::config::LedgerConfig;
use crate::domain::chain::{throughput, verify_blocks};
use crate::domain::contracts::{code_hash, contract_address, TREASURY};
use crate::domain::journal::ValueEntry;
use crate::domain::snapshot::LedgerSnapshot;
use crate::domain::state::LedgerState;
use crate::domain::views::{AccountSummary, NodeStatus, WalletCreated};
use crate::error::{EntityKind, LedgerError, LedgerResult};
use ed25519_dalek::SigningKey;
use parking_lot::{Mutex, RwLock};
use qc_02_tx_validation::{
    Ed25519Authenticator, TransactionValidator, TransferRequest, ValidationOutcome,
};
use qc_05_block_assembly::{AssemblyContext, AssemblyOutcome};
use rand::rngs::OsRng;
use shared_bus::{EventFilter, EventPublisher, EventStream, InMemoryEventBus, LedgerEvent, Subscription};
use shared_types::{
    Address, Amount, Block, BlockNumber, ContractDeployment, Hash, LedgerStats, SystemTimeSource,
    TimeSource, Transaction, Validator,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Handle to the periodic block producer.
struct ProducerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Single-node proof-of-stake ledger.
pub struct Ledger {
    config: LedgerConfig,
    admission: TransactionValidator,
    state: Mutex<LedgerState>,
    chain: RwLock<Vec<Arc<Block>>>,
    bus: Arc<InMemoryEventBus>,
    clock: Arc<dyn TimeSource>,
    running: AtomicBool,
    /// Bumped by every stop; a producer task only seals for its own run.
    generation: AtomicU64,
    lifecycle: Mutex<Option<ProducerHandle>>,
}

impl Ledger {
    /// Ledger on the wall clock with its own event bus.
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        let bus = Arc::new(InMemoryEventBus::with_capacity(config.event_capacity));
        Self::with_parts(config, Arc::new(SystemTimeSource), bus)
    }

    /// Ledger with an injected clock and bus.
    pub fn with_parts(
        config: LedgerConfig,
        clock: Arc<dyn TimeSource>,
        bus: Arc<InMemoryEventBus>,
    ) -> LedgerResult<Self> {
        let state = LedgerState::new(&config)?;
        Ok(Self::assemble(config, state, Vec::new(), clock, bus))
    }

    /// Rebuild a stopped ledger from a snapshot.
    ///
    /// # Errors
    /// `ChainCorrupted` when the chain fails verification, when replaying
    /// the chain and journal does not reproduce every block's state root and
    /// the snapshot's accounts, or when pending transactions do not follow
    /// account state.
    pub fn restore(
        config: LedgerConfig,
        snapshot: LedgerSnapshot,
        clock: Arc<dyn TimeSource>,
        bus: Arc<InMemoryEventBus>,
    ) -> LedgerResult<Self> {
        verify_blocks(&snapshot.blocks)?;
        let state = LedgerState::restore(&config, &snapshot)?;
        let chain: Vec<Arc<Block>> = snapshot.blocks.into_iter().map(Arc::new).collect();
        info!(
            height = chain.len(),
            accounts = state.accounts.len(),
            pending = state.mempool.size(),
            "[qc-06] Ledger restored from snapshot"
        );
        Ok(Self::assemble(config, state, chain, clock, bus))
    }

    fn assemble(
        config: LedgerConfig,
        state: LedgerState,
        chain: Vec<Arc<Block>>,
        clock: Arc<dyn TimeSource>,
        bus: Arc<InMemoryEventBus>,
    ) -> Self {
        let admission = if config.require_signatures {
            TransactionValidator::new(Arc::new(Ed25519Authenticator))
        } else {
            TransactionValidator::permissive()
        };
        debug!(
            authenticator = admission.authenticator_name(),
            "[qc-06] Admission configured"
        );
        Self {
            config,
            admission,
            state: Mutex::new(state),
            chain: RwLock::new(chain),
            bus,
            clock,
            running: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            lifecycle: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The bus events are published to.
    #[must_use]
    pub fn bus(&self) -> Arc<InMemoryEventBus> {
        Arc::clone(&self.bus)
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Start block production.
    ///
    /// Seals genesis if the chain is empty. Inside a tokio runtime a producer
    /// task ticks every `block_interval_ms`; outside one, blocks are only
    /// produced through [`Ledger::produce_block`].
    pub fn start(self: &Arc<Self>) -> LedgerResult<()> {
        let mut lifecycle = self.lifecycle.lock();
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(LedgerError::AlreadyRunning);
        }

        {
            let mut state = self.state.lock();
            if self.chain.read().is_empty() {
                self.tick_locked(&mut state);
            }
            self.bus.publish(LedgerEvent::NodeStarted {
                block_height: self.height(),
            });
        }

        *lifecycle = self.spawn_producer();
        info!(
            height = self.height(),
            interval_ms = self.config.block_interval_ms,
            "[qc-06] Node started"
        );
        Ok(())
    }

    /// Stop block production. Idempotent.
    ///
    /// A tick already inside `produce_block` completes; later submissions
    /// fail with `NodeNotRunning`, and the old producer task never seals
    /// again even if the node is restarted right away.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(producer) = lifecycle.take() {
            if producer.shutdown.send(true).is_err() {
                debug!("[qc-06] Producer task already gone");
            }
            producer.task.abort();
        }

        let _state = self.state.lock();
        self.bus.publish(LedgerEvent::NodeStopped {
            block_height: self.height(),
        });
        info!(height = self.height(), "[qc-06] Node stopped");
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn status(&self) -> NodeStatus {
        NodeStatus {
            running: self.is_running(),
            block_height: self.height(),
            pending_transactions: self.state.lock().mempool.size() as u64,
            block_interval_ms: self.config.block_interval_ms,
        }
    }

    fn spawn_producer(self: &Arc<Self>) -> Option<ProducerHandle> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("[qc-06] No async runtime, blocks will only be produced on demand");
            return None;
        };

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let ledger: Weak<Self> = Arc::downgrade(self);
        let generation = self.generation.load(Ordering::SeqCst);
        let period = Duration::from_millis(self.config.block_interval_ms.max(1));

        let task = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let Some(ledger) = ledger.upgrade() else { break };
                        ledger.produce_scheduled(generation);
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("[qc-06] Block producer exited");
        });

        Some(ProducerHandle { shutdown, task })
    }

    // =========================================================================
    // BLOCK PRODUCTION
    // =========================================================================

    /// Run one production tick now.
    ///
    /// Returns the sealed block, or `None` when the tick was skipped or the
    /// node is stopped.
    pub fn produce_block(&self) -> Option<Arc<Block>> {
        let mut state = self.state.lock();
        if !self.is_running() {
            return None;
        }
        self.produce_locked(&mut state)
    }

    /// Tick from the producer task started for `generation`.
    pub(crate) fn produce_scheduled(&self, generation: u64) -> Option<Arc<Block>> {
        let mut state = self.state.lock();
        if !self.is_running() || self.generation.load(Ordering::SeqCst) != generation {
            return None;
        }
        self.produce_locked(&mut state)
    }

    fn produce_locked(&self, state: &mut LedgerState) -> Option<Arc<Block>> {
        let sealed = self.tick_locked(state);
        let stats = self.collect_stats(state);
        self.bus.publish(LedgerEvent::StatsUpdated(stats));
        sealed
    }

    fn tick_locked(&self, state: &mut LedgerState) -> Option<Arc<Block>> {
        let now = self.clock.now();
        let head = self.chain.read().last().cloned();

        let LedgerState {
            accounts,
            mempool,
            registry,
            assembler,
            ..
        } = state;
        let outcome = assembler.produce(
            AssemblyContext {
                accounts,
                mempool,
                registry,
                head: head.as_deref(),
            },
            now,
        );

        let (block, confirmed, rejected) = match outcome {
            AssemblyOutcome::Skipped => return None,
            AssemblyOutcome::Genesis(block) => (block, Vec::new(), Vec::new()),
            AssemblyOutcome::Sealed {
                block,
                confirmed,
                rejected,
            } => (block, confirmed, rejected),
        };

        let block = Arc::new(block);
        self.chain.write().push(Arc::clone(&block));
        self.bus.publish(LedgerEvent::BlockSealed((*block).clone()));

        for tx in confirmed {
            state.record(tx.clone());
            self.bus.publish(LedgerEvent::TransactionConfirmed(tx));
        }
        for tx in rejected {
            warn!(
                hash = %tx.hash,
                reason = ?tx.rejection,
                "[qc-06] Transaction dropped at sealing"
            );
            state.record(tx.clone());
            self.bus.publish(LedgerEvent::TransactionRejected(tx));
        }

        Some(block)
    }

    // =========================================================================
    // ADMISSION
    // =========================================================================

    /// Validate a transfer and admit it to the mempool.
    ///
    /// The sender's available balance drops immediately; the recipient is
    /// credited only when the transfer is sealed. Every rejection is also
    /// published as `TransactionRejected`.
    pub fn submit_transaction(&self, request: TransferRequest) -> LedgerResult<Transaction> {
        let mut state = self.state.lock();
        if !self.is_running() {
            return Err(LedgerError::NodeNotRunning);
        }

        let now = self.clock.now();
        let sender = state
            .accounts
            .exists(&request.from)
            .then(|| state.accounts.get(&request.from));
        let pending = state.pending_context(&request.from);
        let key = state.keys.get(&request.from).copied();

        let tx = match self
            .admission
            .validate(&request, sender.as_ref(), pending, key.as_ref(), now)
        {
            ValidationOutcome::Accepted(tx) => tx,
            ValidationOutcome::Rejected(reason) => {
                let expected = sender.map_or(0, |a| a.nonce + pending.count);
                return Err(self.reject(&request, expected, now, reason));
            }
        };

        if let Err(err) = state.mempool.admit(tx.clone()) {
            return Err(self.reject(&request, tx.nonce, now, err.into()));
        }
        state.accounts.reserve_nonce(&tx.from)?;
        state.record(tx.clone());

        debug!(
            hash = %tx.hash,
            from = %tx.from,
            to = %tx.to,
            amount = tx.amount,
            nonce = tx.nonce,
            "[qc-06] Transaction admitted"
        );
        self.bus.publish(LedgerEvent::TransactionAdmitted(tx.clone()));
        Ok(tx)
    }

    fn reject(
        &self,
        request: &TransferRequest,
        expected_nonce: u64,
        now: u64,
        reason: shared_types::RejectReason,
    ) -> LedgerError {
        let mut tx = Transaction::new(
            request.from,
            request.to,
            request.amount,
            request.nonce.unwrap_or(expected_nonce),
            request.fee,
            now,
        );
        tx.reject(reason.clone());
        debug!(
            hash = %tx.hash,
            from = %tx.from,
            %reason,
            "[qc-06] Transaction rejected"
        );
        self.bus.publish(LedgerEvent::TransactionRejected(tx));
        LedgerError::from_rejection(reason, request.from)
    }

    // =========================================================================
    // WALLETS
    // =========================================================================

    /// Generate an ed25519 wallet funded with the initial balance.
    pub fn create_wallet(&self) -> LedgerResult<WalletCreated> {
        let signing = SigningKey::generate(&mut OsRng);
        let public_key = signing.verifying_key().to_bytes();
        let address = Address::from_public_key(&public_key);
        let balance = self.config.initial_balance;

        let mut state = self.state.lock();
        state.accounts.open(address, balance)?;
        state.total_issued = state.total_issued.saturating_add(balance);
        state.keys.insert(address, public_key);
        state.record_value(self.height(), ValueEntry::WalletOpened { address, balance });
        drop(state);

        info!(%address, balance, "[qc-06] Wallet created");
        Ok(WalletCreated {
            address,
            balance,
            nonce: 0,
            public_key: hex::encode(public_key),
            private_key: hex::encode(signing.to_bytes()),
        })
    }

    /// Account view including pending effects.
    pub fn get_account(&self, address: &Address) -> LedgerResult<AccountSummary> {
        self.state
            .lock()
            .summary(address)
            .ok_or_else(|| LedgerError::unknown(EntityKind::Account, address))
    }

    /// Balance minus pending debits; zero for unknown accounts.
    #[must_use]
    pub fn available_balance(&self, address: &Address) -> Amount {
        self.state.lock().available_balance(address)
    }

    // =========================================================================
    // STAKING
    // =========================================================================

    /// Stake `stake` from `address` and join the active validator set.
    pub fn register_validator(&self, address: Address, stake: Amount) -> LedgerResult<Validator> {
        let mut state = self.state.lock();
        if !state.accounts.exists(&address) {
            return Err(LedgerError::unknown(EntityKind::Account, address));
        }
        let available = state.available_balance(&address);
        let now = self.clock.now();

        let LedgerState {
            accounts, registry, ..
        } = &mut *state;
        let validator = registry.register(address, stake, available, accounts, now)?;
        state.record_value(
            self.height(),
            ValueEntry::Staked {
                address,
                stake,
                joined_at: validator.joined_at,
            },
        );
        self.bus
            .publish(LedgerEvent::ValidatorRegistered(validator.clone()));
        Ok(validator)
    }

    /// Leave the active set and refund the stake.
    pub fn unstake_validator(&self, address: &Address) -> LedgerResult<Validator> {
        let mut state = self.state.lock();
        let LedgerState {
            accounts, registry, ..
        } = &mut *state;
        let validator = registry.unstake(address, accounts)?;
        state.record_value(self.height(), ValueEntry::Unstaked { address: *address });
        self.bus
            .publish(LedgerEvent::ValidatorUnstaked(validator.clone()));
        Ok(validator)
    }

    /// Every validator in registration order, inactive ones included.
    #[must_use]
    pub fn list_validators(&self) -> Vec<Validator> {
        self.state.lock().registry.list_all().to_vec()
    }

    // =========================================================================
    // CONTRACTS
    // =========================================================================

    /// Meter an opaque deployment and charge its fee to `from`.
    pub fn deploy_contract(
        &self,
        from: Address,
        code: &[u8],
        args: &[u8],
    ) -> LedgerResult<ContractDeployment> {
        let mut state = self.state.lock();
        if !self.is_running() {
            return Err(LedgerError::NodeNotRunning);
        }
        if code.is_empty() {
            return Err(LedgerError::Validation("contract code is empty".into()));
        }
        let payload_len = code.len() + args.len();
        if payload_len > self.config.contracts.max_payload_bytes {
            return Err(LedgerError::Validation(format!(
                "payload of {payload_len} bytes exceeds {}",
                self.config.contracts.max_payload_bytes
            )));
        }
        if !state.accounts.exists(&from) {
            return Err(LedgerError::unknown(EntityKind::Account, from));
        }

        let gas_used = self.config.contracts.gas_for(payload_len);
        let fee = self.config.contracts.fee_for(gas_used);
        let available = state.available_balance(&from);
        if available < fee {
            return Err(LedgerError::InsufficientFunds {
                available,
                required: fee,
            });
        }
        if fee > 0 {
            state.accounts.transfer(from, TREASURY, fee)?;
        }
        state.record_value(self.height(), ValueEntry::ContractFee { deployer: from, fee });

        let code_hash = code_hash(code);
        let index = state.contracts.len() as u64;
        let deployment = ContractDeployment {
            address: contract_address(&from, &code_hash, index),
            deployer: from,
            code_hash,
            gas_used,
            fee,
            deployed_at: self.clock.now(),
        };
        state.contracts.push(deployment.clone());

        info!(
            address = %deployment.address,
            deployer = %from,
            gas_used,
            fee,
            "[qc-06] Contract deployed"
        );
        Ok(deployment)
    }

    // =========================================================================
    // CHAIN QUERIES
    // =========================================================================

    /// Number of the head block, 0 before genesis.
    #[must_use]
    pub fn height(&self) -> BlockNumber {
        self.chain.read().last().map_or(0, |b| b.number())
    }

    #[must_use]
    pub fn get_chain_head(&self) -> Option<Arc<Block>> {
        self.chain.read().last().cloned()
    }

    pub fn get_block(&self, number: BlockNumber) -> LedgerResult<Arc<Block>> {
        number
            .checked_sub(1)
            .and_then(|index| self.chain.read().get(index as usize).cloned())
            .ok_or_else(|| LedgerError::unknown(EntityKind::Block, number))
    }

    /// Newest first.
    #[must_use]
    pub fn recent_blocks(&self, limit: usize) -> Vec<Arc<Block>> {
        self.chain.read().iter().rev().take(limit).cloned().collect()
    }

    pub fn get_transaction(&self, hash: &Hash) -> LedgerResult<Transaction> {
        self.state
            .lock()
            .transactions
            .get(hash)
            .cloned()
            .ok_or_else(|| LedgerError::unknown(EntityKind::Transaction, hash))
    }

    /// Newest first.
    #[must_use]
    pub fn recent_transactions(&self, limit: usize) -> Vec<Transaction> {
        self.state.lock().recent_transactions(limit)
    }

    /// Re-verify the whole chain.
    pub fn verify_chain(&self) -> LedgerResult<()> {
        let chain = self.chain.read().clone();
        verify_blocks(&chain)
    }

    // =========================================================================
    // STATS, EVENTS, SNAPSHOTS
    // =========================================================================

    #[must_use]
    pub fn get_stats(&self) -> LedgerStats {
        let state = self.state.lock();
        self.collect_stats(&state)
    }

    fn collect_stats(&self, state: &LedgerState) -> LedgerStats {
        let chain = self.chain.read();
        LedgerStats {
            running: self.is_running(),
            block_height: chain.last().map_or(0, |b| b.number()),
            total_blocks: chain.len() as u64,
            total_transactions: state.transactions.len() as u64,
            pending_transactions: state.mempool.size() as u64,
            total_validators: state.registry.active_count() as u64,
            total_wallets: state.keys.len() as u64,
            total_stake: state.registry.total_active_stake(),
            total_issued: state.total_issued,
            total_contracts: state.contracts.len() as u64,
            tps: throughput(chain.as_slice(), self.config.stats_window),
            peers: self.bus.subscriber_count() as u64,
        }
    }

    /// Value accounted for right now: Σ balances + Σ active stakes.
    ///
    /// Always equals `get_stats().total_issued`.
    #[must_use]
    pub fn accounted_value(&self) -> Amount {
        self.state.lock().accounted_value()
    }

    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.bus.subscribe(filter)
    }

    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        self.bus.event_stream(filter)
    }

    /// Consistent copy of everything needed to rebuild the ledger.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.lock();
        let blocks = self.chain.read().iter().map(|b| (**b).clone()).collect();
        LedgerSnapshot {
            blocks,
            accounts: state.accounts.accounts().collect(),
            validators: state.registry.list_all().to_vec(),
            pending: state.mempool.snapshot(),
            transactions: state.transaction_history(),
            contracts: state.contracts.clone(),
            keys: state.keys.iter().map(|(a, k)| (*a, *k)).collect(),
            total_issued: state.total_issued,
            journal: state.journal.clone(),
        }
    }
}

impl Drop for Ledger {
    fn drop(&mut self) {
        if let Some(producer) = self.lifecycle.get_mut().take() {
            let _ = producer.shutdown.send(true);
            producer.task.abort();
            warn!("[qc-06] Ledger dropped while running, producer aborted");
        }
    }
}
