use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::state::AppState;
use crate::ws::hub::RoomHub;
use crate::ws::protocol::ClientEvent;
use crate::ws::room::{ConnectionState, RoomEffect};

/// HTTP handler that upgrades the connection to a chatroom WebSocket.
///
/// The chatroom is unauthenticated: clients name themselves on `join_room`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.rooms))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `RoomHub`.
///   2. Spawns a sender task that forwards messages from the hub channel.
///   3. Applies inbound client events to this connection's room state.
///   4. Leaves the current room and cleans up on disconnect.
async fn handle_socket(socket: WebSocket, hub: Arc<RoomHub>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut rx = hub.add(conn_id.clone()).await;
    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    let mut state = ConnectionState::new();

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(text.as_str()) {
                Ok(event) => {
                    tracing::debug!(conn_id = %conn_id, ?event, "Chatroom event");
                    let effects = state.apply(event);
                    apply_effects(&hub, &conn_id, effects).await;
                }
                Err(e) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "Ignoring malformed chatroom frame");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    let effects = state.disconnect();
    apply_effects(&hub, &conn_id, effects).await;

    hub.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

async fn apply_effects(hub: &RoomHub, conn_id: &str, effects: Vec<RoomEffect>) {
    for effect in effects {
        match effect {
            RoomEffect::Enter(room) => hub.set_room(conn_id, Some(room)).await,
            RoomEffect::Exit(_) => hub.set_room(conn_id, None).await,
            RoomEffect::Broadcast { room, event } => match event.to_message() {
                Ok(message) => {
                    let delivered = hub.broadcast_to_room(&room, message).await;
                    tracing::trace!(room = %room, delivered, "Chatroom broadcast");
                }
                Err(e) => {
                    tracing::error!(room = %room, error = %e, "Failed to encode chatroom event");
                }
            },
        }
    }
}
