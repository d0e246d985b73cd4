//! # Value Journal
//!
//! Sealed transfers are the only balance changes a block carries. Everything
//! else that moves value is journaled with the chain height it happened at:
//!
//! | Entry          | Effect                                         |
//! |----------------|------------------------------------------------|
//! | `Allocated`    | genesis allocation credited, supply grows      |
//! | `WalletOpened` | wallet account opened, supply grows            |
//! | `Staked`       | stake debited, validator joins the active set  |
//! | `Unstaked`     | validator leaves the set, stake refunded       |
//! | `ContractFee`  | deployment fee moved to the treasury           |
//!
//! ## Replay
//!
//! ```text
//! journal@0 → genesis → journal@1 → block 2 → journal@2 → ... → journal@head
//!                │                     │
//!            state_root            state_root
//! ```
//!
//! Replaying the journal between the blocks rebuilds accounts and the
//! validator set from nothing. After every block the replayed state root
//! must equal the one the block was sealed with.

use super::contracts::TREASURY;
use crate::error::{LedgerError, LedgerResult};
use qc_01_account_store::AccountStore;
use qc_04_validator_registry::ValidatorRegistry;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, Block, BlockNumber, Timestamp};
use std::collections::BTreeSet;
use tracing::debug;

/// A balance change that is not a sealed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueEntry {
    Allocated {
        address: Address,
        amount: Amount,
    },
    WalletOpened {
        address: Address,
        balance: Amount,
    },
    Staked {
        address: Address,
        stake: Amount,
        joined_at: Timestamp,
    },
    Unstaked {
        address: Address,
    },
    ContractFee {
        deployer: Address,
        fee: Amount,
    },
}

/// A journal entry and the chain height it was applied at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    /// Head block number at the time, 0 before genesis.
    pub height: BlockNumber,
    pub entry: ValueEntry,
}

/// Ledger state rebuilt from the chain and the journal.
pub struct Replay {
    pub accounts: AccountStore,
    pub registry: ValidatorRegistry,
    pub total_issued: Amount,
    /// Accounts opened through wallet creation.
    pub wallets: BTreeSet<Address>,
    /// `(deployer, fee)` of every deployment, in order.
    pub contract_fees: Vec<(Address, Amount)>,
    height: BlockNumber,
}

impl Replay {
    fn new(registry: ValidatorRegistry) -> Self {
        Self {
            accounts: AccountStore::new(),
            registry,
            total_issued: 0,
            wallets: BTreeSet::new(),
            contract_fees: Vec::new(),
            height: 0,
        }
    }

    fn step(&mut self, record: &JournalRecord) -> LedgerResult<()> {
        if record.height < self.height {
            return Err(LedgerError::corrupted(
                record.height,
                "journal entries out of order",
            ));
        }
        self.height = record.height;
        self.apply(&record.entry).map_err(|err| {
            LedgerError::corrupted(
                record.height,
                format!("journal entry {:?} does not apply: {err}", record.entry),
            )
        })
    }

    fn apply(&mut self, entry: &ValueEntry) -> LedgerResult<()> {
        match *entry {
            ValueEntry::Allocated { address, amount } => {
                self.accounts.credit(address, amount)?;
                self.total_issued = self.total_issued.saturating_add(amount);
            }
            ValueEntry::WalletOpened { address, balance } => {
                self.accounts.open(address, balance)?;
                self.total_issued = self.total_issued.saturating_add(balance);
                self.wallets.insert(address);
            }
            ValueEntry::Staked {
                address,
                stake,
                joined_at,
            } => {
                self.registry
                    .replay_registration(address, stake, &mut self.accounts, joined_at)?;
            }
            ValueEntry::Unstaked { address } => {
                self.registry.unstake(&address, &mut self.accounts)?;
            }
            ValueEntry::ContractFee { deployer, fee } => {
                if fee > 0 {
                    self.accounts.transfer(deployer, TREASURY, fee)?;
                }
                self.contract_fees.push((deployer, fee));
            }
        }
        Ok(())
    }
}

/// Rebuild state from a verified chain and its journal.
///
/// # Errors
/// `ChainCorrupted` when an entry or a sealed transfer does not apply, when
/// entries are out of order or newer than the head, or when a block's
/// `state_root` differs from the replayed state.
pub fn replay(
    blocks: &[Block],
    journal: &[JournalRecord],
    registry: ValidatorRegistry,
) -> LedgerResult<Replay> {
    let head = blocks.last().map_or(0, Block::number);
    let mut replay = Replay::new(registry);
    let mut entries = journal.iter().peekable();

    for block in blocks {
        let number = block.number();
        while let Some(record) = entries.next_if(|r| r.height < number) {
            replay.step(record)?;
        }
        for tx in &block.transactions {
            replay
                .accounts
                .apply_transfer(tx, &block.header.producer)
                .map_err(|err| {
                    LedgerError::corrupted(
                        number,
                        format!("transaction {} does not apply: {err}", tx.hash),
                    )
                })?;
        }
        if replay.accounts.state_root() != block.header.state_root {
            return Err(LedgerError::corrupted(
                number,
                "state root does not match replayed history",
            ));
        }
        replay.height = number;
    }

    for record in entries {
        if record.height > head {
            return Err(LedgerError::corrupted(
                record.height,
                format!("journal entry beyond chain head {head}"),
            ));
        }
        replay.step(record)?;
    }

    debug!(
        height = head,
        entries = journal.len(),
        accounts = replay.accounts.len(),
        "[qc-06] History replayed"
    );
    Ok(replay)
}
