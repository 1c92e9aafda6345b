//! Chatroom wire format: JSON text frames of the form
//! `{"event": "<name>", "data": <payload>}`.

use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};

/// Events sent by clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom { username: String, room: String },
    LeaveRoom { username: String, room: String },
    ChatMessage { message: String, room: String },
}

/// Events sent by the server to every member of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    SystemMessage(String),
    ChatMessage { username: String, message: String },
}

impl ServerEvent {
    pub fn to_message(&self) -> Result<Message, serde_json::Error> {
        let text = serde_json::to_string(self)?;
        Ok(Message::Text(text.into()))
    }
}
