//! WebSocket fan-out of relay updates
//!
//! Each connected client receives every accepted update as the JSON of its
//! `UpdateEnvelope`. Incoming text frames are ignored; close ends the session.

use crate::state::RelayState;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

pub async fn handle_connection(socket: WebSocket, state: Arc<RelayState>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut updates_rx = state.updates_tx.subscribe();
    info!("Relay subscriber connected");

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(WsMessage::Close(_))) | None => {
                        info!("Relay subscriber disconnected");
                        return;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        return;
                    }
                    Some(Ok(other)) => debug!("Ignoring client frame: {:?}", other),
                }
            }

            update = updates_rx.recv() => {
                match update {
                    Ok(envelope) => {
                        let json = match serde_json::to_string(&envelope) {
                            Ok(json) => json,
                            Err(e) => {
                                warn!("Failed to encode update {}: {}", envelope.id, e);
                                continue;
                            }
                        };
                        if ws_tx.send(WsMessage::Text(json)).await.is_err() {
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Subscriber lagged, dropped {} updates", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Update broadcast closed");
                        return;
                    }
                }
            }
        }
    }
}
