//! Repository for the `chat_sessions` table.

use sqlx::{PgConnection, PgPool};
use tripchat_core::types::{DbId, Timestamp};

use crate::models::chat_session::{ChatSession, CreateChatSession, SessionSummary};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, user_id, session_id, session_name, last_activity_timestamp, created_at";

/// Columns of the [`SessionSummary`] projection.
const SUMMARY_COLUMNS: &str = "session_id, session_name, last_activity_timestamp";

/// Provides CRUD operations for chat sessions.
pub struct ChatSessionRepo;

impl ChatSessionRepo {
    /// Insert a new session stamped with the current time.
    ///
    /// A second session with the same `session_id` for the same user violates
    /// `uq_chat_sessions_user_session`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateChatSession,
    ) -> Result<ChatSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO chat_sessions (user_id, session_id, session_name)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChatSession>(&query)
            .bind(user_id)
            .bind(&input.session_id)
            .bind(&input.session_name)
            .fetch_one(pool)
            .await
    }

    /// List a user's sessions, most recently active first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SessionSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM chat_sessions
             WHERE user_id = $1
             ORDER BY last_activity_timestamp DESC, id DESC"
        );
        sqlx::query_as::<_, SessionSummary>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Move a session's activity timestamp forward to `at`.
    ///
    /// The timestamp never moves backwards, so a late-committing older
    /// message cannot reorder the list. Returns `None` if the session does
    /// not exist.
    pub(crate) async fn touch(
        conn: &mut PgConnection,
        user_id: DbId,
        session_id: &str,
        at: Timestamp,
    ) -> Result<Option<ChatSession>, sqlx::Error> {
        let query = format!(
            "UPDATE chat_sessions
             SET last_activity_timestamp = GREATEST(last_activity_timestamp, $3)
             WHERE user_id = $1 AND session_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChatSession>(&query)
            .bind(user_id)
            .bind(session_id)
            .bind(at)
            .fetch_optional(conn)
            .await
    }

    /// Insert a session whose first activity is `at`, unless it already exists.
    ///
    /// Returns `None` when a concurrent request created it first.
    pub(crate) async fn create_at(
        conn: &mut PgConnection,
        user_id: DbId,
        input: &CreateChatSession,
        at: Timestamp,
    ) -> Result<Option<ChatSession>, sqlx::Error> {
        let query = format!(
            "INSERT INTO chat_sessions (user_id, session_id, session_name, last_activity_timestamp)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, session_id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChatSession>(&query)
            .bind(user_id)
            .bind(&input.session_id)
            .bind(&input.session_name)
            .bind(at)
            .fetch_optional(conn)
            .await
    }
}
