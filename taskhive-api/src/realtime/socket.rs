//! WebSocket endpoint for project rooms.
//!
//! Connections upgrade at `GET /ws` without authentication; room
//! membership is advisory and carries no read rights beyond event
//! frames. A single connection may join any number of rooms.
//!
//! Client frames:
//!
//! ```text
//! {"action":"join","project":"<uuid>"}
//! {"action":"leave","project":"<uuid>"}
//! ```
//!
//! Frames that fail to parse are ignored. Joining a room twice or
//! leaving one never joined is a no-op.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::app::AppState;

/// Frames buffered per connection before room forwarders block
const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Parsed client frame
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "lowercase")]
enum ClientFrame {
    Join { project: Uuid },
    Leave { project: Uuid },
}

/// Handles `GET /ws` upgrade requests
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drives one WebSocket connection until it closes.
///
/// Every joined room gets a forwarder task piping that room's broadcast
/// receiver into a single outbound queue, so one writer owns the socket
/// sink no matter how many rooms the connection watches.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (out_tx, mut out_rx) = mpsc::channel::<String>(OUTBOUND_QUEUE_CAPACITY);
    let mut forwarders: HashMap<Uuid, JoinHandle<()>> = HashMap::new();

    debug!("WebSocket connection established");

    loop {
        tokio::select! {
            Some(frame) = out_rx.recv() => {
                if ws_tx.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }

            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => match serde_json::from_str(&text) {
                        Ok(ClientFrame::Join { project }) => {
                            if forwarders.contains_key(&project) {
                                debug!(project_id = %project, "Already joined, ignoring");
                            } else {
                                let rx = state.rooms.join(project).await;
                                let handle = tokio::spawn(forward_room(rx, out_tx.clone()));
                                forwarders.insert(project, handle);
                            }
                        }
                        Ok(ClientFrame::Leave { project }) => {
                            if let Some(handle) = forwarders.remove(&project) {
                                handle.abort();
                                let _ = handle.await;
                                state.rooms.leave(project).await;
                                debug!(project_id = %project, "Connection left room");
                            }
                        }
                        Err(e) => {
                            debug!(error = %e, "Ignoring unparseable client frame");
                        }
                    },
                    Some(Ok(Message::Ping(payload))) => {
                        if ws_tx.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        // Binary and pong frames carry nothing for us
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "WebSocket error, closing connection");
                        break;
                    }
                }
            }
        }
    }

    // Tear down every room this connection was watching
    for (project_id, handle) in forwarders {
        handle.abort();
        let _ = handle.await;
        state.rooms.leave(project_id).await;
    }

    debug!("WebSocket connection closed");
}

/// Pipes one room's broadcast stream into the connection's outbound queue
async fn forward_room(mut rx: broadcast::Receiver<String>, out: mpsc::Sender<String>) {
    loop {
        match rx.recv().await {
            Ok(frame) => {
                if out.send(frame).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Subscriber lagging, frames dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join_frame() {
        let project = Uuid::new_v4();
        let text = format!(r#"{{"action":"join","project":"{}"}}"#, project);

        let frame: ClientFrame = serde_json::from_str(&text).expect("Should parse join frame");
        assert_eq!(frame, ClientFrame::Join { project });
    }

    #[test]
    fn test_parse_leave_frame() {
        let project = Uuid::new_v4();
        let text = format!(r#"{{"action":"leave","project":"{}"}}"#, project);

        let frame: ClientFrame = serde_json::from_str(&text).expect("Should parse leave frame");
        assert_eq!(frame, ClientFrame::Leave { project });
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let text = r#"{"action":"subscribe","project":"4b4ee3a1-8e57-4d10-9a51-1d6903a1f8a4"}"#;
        assert!(serde_json::from_str::<ClientFrame>(text).is_err());
    }

    #[test]
    fn test_malformed_project_id_is_rejected() {
        let text = r#"{"action":"join","project":"not-a-uuid"}"#;
        assert!(serde_json::from_str::<ClientFrame>(text).is_err());
    }

    #[tokio::test]
    async fn test_forwarder_pipes_frames() {
        let (room_tx, room_rx) = broadcast::channel::<String>(8);
        let (out_tx, mut out_rx) = mpsc::channel::<String>(8);

        let handle = tokio::spawn(forward_room(room_rx, out_tx));

        room_tx.send("frame-1".to_string()).expect("Should send");
        room_tx.send("frame-2".to_string()).expect("Should send");

        assert_eq!(out_rx.recv().await.expect("Should forward"), "frame-1");
        assert_eq!(out_rx.recv().await.expect("Should forward"), "frame-2");

        drop(room_tx);
        handle.await.expect("Forwarder should exit when room closes");
    }
}
