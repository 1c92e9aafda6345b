//! Chat session model and DTOs.
//!
//! A chat session is a named conversation thread between a user and the AI
//! service. It is unrelated to authentication.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tripchat_core::types::{DbId, Timestamp};

/// Full row from the `chat_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatSession {
    pub id: DbId,
    pub user_id: DbId,
    pub session_id: String,
    pub session_name: String,
    pub last_activity_timestamp: Timestamp,
    pub created_at: Timestamp,
}

/// The projection returned by the session list endpoint and kept in the
/// `sessions_list:{user}` cache entry.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub session_name: String,
    pub last_activity_timestamp: Timestamp,
}

impl From<&ChatSession> for SessionSummary {
    fn from(session: &ChatSession) -> Self {
        Self {
            session_id: session.session_id.clone(),
            session_name: session.session_name.clone(),
            last_activity_timestamp: session.last_activity_timestamp,
        }
    }
}

/// DTO for creating a new chat session.
#[derive(Debug)]
pub struct CreateChatSession {
    pub session_id: String,
    pub session_name: String,
}
