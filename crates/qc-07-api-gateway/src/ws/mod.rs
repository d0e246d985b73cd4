//! WebSocket push of ledger events.

pub mod handler;

pub use handler::{encode_event, ws_upgrade, WebSocketHandler};
