use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};
use tripchat_core::types::Timestamp;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// One registered chatroom connection.
pub struct RoomConnection {
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// Room the connection currently belongs to, if any.
    pub room: Option<String>,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Registry of chatroom connections and their room membership.
///
/// Thread-safe via interior `RwLock`; wrap in `Arc` and share across the
/// application.
pub struct RoomHub {
    connections: RwLock<HashMap<String, RoomConnection>>,
}

impl RoomHub {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection outside of any room.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = RoomConnection {
            sender: tx,
            room: None,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID.
    pub async fn remove(&self, conn_id: &str) {
        if let Some(conn) = self.connections.write().await.remove(conn_id) {
            let connected_secs = (chrono::Utc::now() - conn.connected_at).num_seconds();
            tracing::debug!(conn_id, connected_secs, room = ?conn.room, "Connection removed");
        }
    }

    /// Set (or clear) the room of a connection. Unknown IDs are ignored.
    pub async fn set_room(&self, conn_id: &str, room: Option<String>) {
        if let Some(conn) = self.connections.write().await.get_mut(conn_id) {
            conn.room = room;
        }
    }

    /// Send a message to every connection in `room`.
    ///
    /// Closed channels are skipped; their connections are cleaned up when
    /// their receive loop ends. Returns the number of recipients.
    pub async fn broadcast_to_room(&self, room: &str, message: Message) -> usize {
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values().filter(|c| c.room.as_deref() == Some(room)) {
            if conn.sender.send(message.clone()).is_ok() {
                count += 1;
            }
        }
        count
    }

    /// Number of connections currently in `room`.
    pub async fn room_size(&self, room: &str) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|c| c.room.as_deref() == Some(room))
            .count()
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for RoomHub {
    fn default() -> Self {
        Self::new()
    }
}
