//! # Shared Bus - Ledger Event Fan-Out
//!
//! Every state change the ledger makes is published here once and delivered
//! to any number of observers (WebSocket clients, tests, log sinks).
//!
//! ```text
//! ┌──────────────┐   publish()   ┌──────────────┐  subscribe()  ┌────────────┐
//! │    Ledger    │ ────────────→ │  Event Bus   │ ────────────→ │ Subscriber │
//! │ (under lock) │   never waits │ (broadcast)  │  ring buffer  │  (per ws)  │
//! └──────────────┘               └──────────────┘               └────────────┘
//! ```
//!
//! ## Delivery Semantics
//!
//! - Publishing never blocks: the channel is a bounded ring buffer.
//! - Each subscriber sees events in emission order.
//! - A subscriber that falls more than the channel capacity behind loses its
//!   oldest events (drop-oldest) and is told how many it missed.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, LedgerEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events buffered per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
