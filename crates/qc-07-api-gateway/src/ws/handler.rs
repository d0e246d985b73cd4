//! WebSocket handler for event push.
//!
//! Every connection gets its own bus subscription and receives each event as
//! a `{"type": ..., "data": ...}` text frame, in publication order. A
//! connection that falls behind loses its oldest events; inbound frames other
//! than close and pong are ignored.

use crate::rest::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::StreamExt;
use shared_bus::{EventFilter, EventStream, LedgerEvent};
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Render one event as a text frame.
pub fn encode_event(event: &LedgerEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(kind = event.kind(), error = %e, "[qc-07] Event not serializable");
            None
        }
    }
}

/// `GET /ws`
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let events = state.ledger.event_stream(EventFilter::all());
    let ping_interval = state.ping_interval;
    ws.on_upgrade(move |socket| WebSocketHandler::new(events, ping_interval).handle(socket))
}

/// WebSocket connection handler
pub struct WebSocketHandler {
    connection_id: Uuid,
    events: EventStream,
    ping_interval: Duration,
}

impl WebSocketHandler {
    pub fn new(events: EventStream, ping_interval: Duration) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            events,
            ping_interval,
        }
    }

    /// Handle a WebSocket connection until either side closes.
    pub async fn handle(mut self, mut socket: WebSocket) {
        info!(connection_id = %self.connection_id, "[qc-07] WebSocket connected");

        let period = self.ping_interval.max(Duration::from_millis(100));
        let mut ping = interval_at(Instant::now() + period, period);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sent: u64 = 0;

        loop {
            tokio::select! {
                event = self.events.next() => {
                    let Some(event) = event else { break };
                    let Some(text) = encode_event(&event) else { continue };
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                    sent += 1;
                }
                inbound = socket.recv() => {
                    match inbound {
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            debug!(connection_id = %self.connection_id, error = %e, "[qc-07] WebSocket read error");
                            break;
                        }
                    }
                }
                _ = ping.tick() => {
                    if socket.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }
            }
        }

        info!(
            connection_id = %self.connection_id,
            sent,
            missed = self.events.missed(),
            "[qc-07] WebSocket disconnected"
        );
    }
}
