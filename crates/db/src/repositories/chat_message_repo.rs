//! Repository for the `chat_messages` table.

use sqlx::PgPool;
use tripchat_core::types::DbId;

use crate::models::chat_message::{AppendedMessage, ChatMessage, CreateChatMessage, MessageEntry};
use crate::models::chat_session::CreateChatSession;
use crate::repositories::ChatSessionRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, session_id, role, content, sent_at";

/// Columns of the [`MessageEntry`] projection.
const ENTRY_COLUMNS: &str = "role, content, sent_at";

/// Provides append and list operations for chat history.
pub struct ChatMessageRepo;

impl ChatMessageRepo {
    /// Append a message and bump its session's activity timestamp.
    ///
    /// Both writes happen in one transaction. If the session does not exist
    /// yet it is created with `input.session_name`; otherwise the stored name
    /// is kept.
    pub async fn append(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateChatMessage,
    ) -> Result<AppendedMessage, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO chat_messages (user_id, session_id, role, content)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let message = sqlx::query_as::<_, ChatMessage>(&insert_query)
            .bind(user_id)
            .bind(&input.session_id)
            .bind(&input.role)
            .bind(&input.content)
            .fetch_one(&mut *tx)
            .await?;

        let mut session_created = false;
        let session = match ChatSessionRepo::touch(
            &mut *tx,
            user_id,
            &input.session_id,
            message.sent_at,
        )
        .await?
        {
            Some(session) => session,
            None => {
                let new_session = CreateChatSession {
                    session_id: input.session_id.clone(),
                    session_name: input.session_name.clone(),
                };
                match ChatSessionRepo::create_at(&mut *tx, user_id, &new_session, message.sent_at)
                    .await?
                {
                    Some(session) => {
                        session_created = true;
                        session
                    }
                    // Lost a race with a concurrent create; the row exists now.
                    None => ChatSessionRepo::touch(
                        &mut *tx,
                        user_id,
                        &input.session_id,
                        message.sent_at,
                    )
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?,
                }
            }
        };

        tx.commit().await?;

        if !session_created && session.session_name != input.session_name {
            tracing::debug!(
                user_id,
                session_id = %input.session_id,
                canonical = %session.session_name,
                submitted = %input.session_name,
                "Ignoring session name submitted with message",
            );
        }

        Ok(AppendedMessage {
            message,
            session,
            session_created,
        })
    }

    /// List a session's messages in chronological order.
    pub async fn list_for_session(
        pool: &PgPool,
        user_id: DbId,
        session_id: &str,
    ) -> Result<Vec<MessageEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM chat_messages
             WHERE user_id = $1 AND session_id = $2
             ORDER BY sent_at ASC, id ASC"
        );
        sqlx::query_as::<_, MessageEntry>(&query)
            .bind(user_id)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }
}
