//! Cache key scheme. Both namespaces are scoped by user id so that entries
//! of different users, and of different sessions, never share a key.

use tripchat_core::types::DbId;

/// Key holding a user's ordered session list.
pub fn sessions_list_key(user_id: DbId) -> String {
    format!("sessions_list:{user_id}")
}

/// Key holding the ordered messages of one session.
pub fn session_messages_key(user_id: DbId, session_id: &str) -> String {
    format!("session_messages:{user_id}:{session_id}")
}
