//! WebSocket relay
//!
//! Forwards broadcast event envelopes to connected clients as JSON frames.

use crate::api::AppState;
use crate::realtime::EventEnvelope;
use axum::{
    extract::ws::{Message, WebSocket},
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

/// Upgrade handler for `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let rx = state.broadcaster.subscribe();
    ws.on_upgrade(move |socket| relay_events(socket, rx))
}

async fn relay_events(socket: WebSocket, mut rx: tokio::sync::broadcast::Receiver<EventEnvelope>) {
    debug!("WebSocket client connected");

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            envelope = rx.recv() => {
                match envelope {
                    Ok(envelope) => {
                        let payload = match serde_json::to_string(&envelope) {
                            Ok(payload) => payload,
                            Err(e) => {
                                warn!(error = %e, "Failed to serialize event envelope");
                                continue;
                            }
                        };
                        if sender.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped = skipped, "WebSocket client lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    // Clients only send pings/closes; anything else is ignored
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    debug!("WebSocket client disconnected");
}
