//! Chat message model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tripchat_core::types::{DbId, Timestamp};

use crate::models::chat_session::ChatSession;

/// Full row from the `chat_messages` table. Immutable once inserted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatMessage {
    pub id: DbId,
    pub user_id: DbId,
    pub session_id: String,
    pub role: String,
    pub content: String,
    #[serde(rename = "timestamp")]
    pub sent_at: Timestamp,
}

/// The projection returned by the history endpoint and kept in the
/// `session_messages:{user}:{session}` cache entry.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct MessageEntry {
    pub role: String,
    pub content: String,
    #[serde(rename = "timestamp")]
    pub sent_at: Timestamp,
}

impl From<&ChatMessage> for MessageEntry {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role.clone(),
            content: message.content.clone(),
            sent_at: message.sent_at,
        }
    }
}

/// DTO for appending a message.
///
/// `session_name` is only consulted when the session does not exist yet and
/// has to be created alongside its first message.
#[derive(Debug)]
pub struct CreateChatMessage {
    pub session_id: String,
    pub session_name: String,
    pub role: String,
    pub content: String,
}

/// Result of an append: the stored message plus the session row it bumped.
#[derive(Debug, Clone)]
pub struct AppendedMessage {
    pub message: ChatMessage,
    pub session: ChatSession,
    /// `true` when the session row was created by this append.
    pub session_created: bool,
}
