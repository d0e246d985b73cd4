//! # Chain Verification
//!
//! | Check                 | Rule                                              |
//! |-----------------------|---------------------------------------------------|
//! | numbering             | block `i` (0-based) has number `i + 1`            |
//! | genesis               | parent is the genesis sentinel, no transactions   |
//! | linkage               | `previous_hash == chain[number - 1].hash`         |
//! | commitments           | tx hashes, transactions root and header hash match |
//! | uniqueness            | no transaction hash appears twice in a block      |
//! | time                  | timestamps never decrease                         |

use crate::error::{LedgerError, LedgerResult};
use shared_types::{Block, GENESIS_BLOCK_NUMBER, GENESIS_PARENT_HASH};
use std::borrow::Borrow;
use std::collections::HashSet;

/// Verify an ordered chain from genesis.
pub fn verify_blocks<B>(blocks: &[B]) -> LedgerResult<()>
where
    B: Borrow<Block>,
{
    let mut previous: Option<&Block> = None;
    for (index, block) in blocks.iter().enumerate() {
        let block: &Block = block.borrow();
        let expected_number = GENESIS_BLOCK_NUMBER + index as u64;
        if block.number() != expected_number {
            return Err(LedgerError::corrupted(
                expected_number,
                format!("found block number {}", block.number()),
            ));
        }

        match previous {
            None => {
                if block.previous_hash() != GENESIS_PARENT_HASH || !block.transactions.is_empty() {
                    return Err(LedgerError::corrupted(
                        block.number(),
                        "malformed genesis block",
                    ));
                }
            }
            Some(parent) => {
                if block.previous_hash() != parent.hash {
                    return Err(LedgerError::corrupted(
                        block.number(),
                        "previous hash does not match parent",
                    ));
                }
                if block.timestamp() < parent.timestamp() {
                    return Err(LedgerError::corrupted(
                        block.number(),
                        "timestamp earlier than parent",
                    ));
                }
            }
        }

        if !block.verify_hash() {
            return Err(LedgerError::corrupted(block.number(), "hash mismatch"));
        }
        let mut seen = HashSet::with_capacity(block.transactions.len());
        if !block.transactions.iter().all(|tx| seen.insert(tx.hash)) {
            return Err(LedgerError::corrupted(
                block.number(),
                "transaction included twice",
            ));
        }
        previous = Some(block);
    }
    Ok(())
}

/// Confirmed transactions per second over the newest `window` blocks.
///
/// The oldest block in the window only marks the start time; its
/// transactions are not counted.
#[must_use]
pub fn throughput<B>(blocks: &[B], window: usize) -> f64
where
    B: Borrow<Block>,
{
    let window = window.max(2).min(blocks.len());
    if window < 2 {
        return 0.0;
    }
    let recent = &blocks[blocks.len() - window..];
    let first: &Block = recent[0].borrow();
    let last: &Block = recent[window - 1].borrow();
    let span_ms = last.timestamp().saturating_sub(first.timestamp());
    if span_ms == 0 {
        return 0.0;
    }
    let confirmed: usize = recent[1..]
        .iter()
        .map(|b| Borrow::<Block>::borrow(b).transactions.len())
        .sum();
    confirmed as f64 * 1_000.0 / span_ms as f64
}
