//! # Ledger Events
//!
//! The push-transport wire shape is `{"type": "...", "data": ...}`, produced by
//! the adjacent tagging below.

use serde::{Deserialize, Serialize};
use shared_types::{Block, BlockNumber, LedgerStats, Transaction, Validator};

/// All events published by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum LedgerEvent {
    // =========================================================================
    // CHAIN
    // =========================================================================
    /// A block was sealed and appended.
    BlockSealed(Block),

    // =========================================================================
    // TRANSACTIONS
    // =========================================================================
    /// A transaction passed validation and entered the mempool.
    TransactionAdmitted(Transaction),

    /// A transaction was included in a sealed block.
    TransactionConfirmed(Transaction),

    /// A transaction was refused at admission or dropped while sealing.
    TransactionRejected(Transaction),

    // =========================================================================
    // STAKING
    // =========================================================================
    /// A validator staked and joined the active set.
    ValidatorRegistered(Validator),

    /// A validator left the active set and its stake was refunded.
    ValidatorUnstaked(Validator),

    // =========================================================================
    // NODE LIFECYCLE
    // =========================================================================
    /// Block production started.
    NodeStarted { block_height: BlockNumber },

    /// Block production stopped.
    NodeStopped { block_height: BlockNumber },

    /// Periodic stats refresh after each production tick.
    StatsUpdated(LedgerStats),
}

impl LedgerEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::BlockSealed(_) => EventTopic::Blocks,
            Self::TransactionAdmitted(_)
            | Self::TransactionConfirmed(_)
            | Self::TransactionRejected(_) => EventTopic::Transactions,
            Self::ValidatorRegistered(_) | Self::ValidatorUnstaked(_) => EventTopic::Validators,
            Self::NodeStarted { .. } | Self::NodeStopped { .. } | Self::StatsUpdated(_) => {
                EventTopic::Node
            }
        }
    }

    /// Wire name, identical to the serialized `type` tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BlockSealed(_) => "block_sealed",
            Self::TransactionAdmitted(_) => "transaction_admitted",
            Self::TransactionConfirmed(_) => "transaction_confirmed",
            Self::TransactionRejected(_) => "transaction_rejected",
            Self::ValidatorRegistered(_) => "validator_registered",
            Self::ValidatorUnstaked(_) => "validator_unstaked",
            Self::NodeStarted { .. } => "node_started",
            Self::NodeStopped { .. } => "node_stopped",
            Self::StatsUpdated(_) => "stats_updated",
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    Blocks,
    Transactions,
    Validators,
    Node,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Address, Hash};

    fn sample_tx() -> Transaction {
        Transaction::new(Address([1; 20]), Address([2; 20]), 100, 0, 0, 0)
    }

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(
            LedgerEvent::BlockSealed(Block::genesis(0, Hash::ZERO)).topic(),
            EventTopic::Blocks
        );
        assert_eq!(
            LedgerEvent::TransactionAdmitted(sample_tx()).topic(),
            EventTopic::Transactions
        );
        assert_eq!(
            LedgerEvent::NodeStopped { block_height: 3 }.topic(),
            EventTopic::Node
        );
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Transactions]);
        assert!(filter.matches(&LedgerEvent::TransactionConfirmed(sample_tx())));
        assert!(!filter.matches(&LedgerEvent::NodeStarted { block_height: 1 }));
        assert!(EventFilter::topics(vec![EventTopic::All])
            .matches(&LedgerEvent::NodeStarted { block_height: 1 }));
    }

    #[test]
    fn test_wire_shape_is_type_and_data() {
        let event = LedgerEvent::TransactionAdmitted(sample_tx());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
        assert_eq!(json["data"]["amount"], 100);
        assert_eq!(json["data"]["status"], "pending");
    }

    #[test]
    fn test_struct_variant_wire_shape() {
        let json = serde_json::to_value(LedgerEvent::NodeStarted { block_height: 7 }).unwrap();
        assert_eq!(json["type"], "node_started");
        assert_eq!(json["data"]["block_height"], 7);
    }
}
