//! Handlers for the `/chatHistory` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tripchat_core::chat::MessageRole;
use tripchat_core::validation::require_field;
use tripchat_db::models::chat_message::{ChatMessage, CreateChatMessage};
use tripchat_db::repositories::ChatMessageRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /api/chatHistory`.
#[derive(Debug, Deserialize)]
pub struct AppendMessageRequest {
    pub role: Option<String>,
    pub content: Option<String>,
    pub session_id: Option<String>,
    pub session_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AppendMessageResponse {
    pub message: ChatMessage,
}

/// GET /api/chatHistory/{session_id}
///
/// Messages of one session in chronological order; 204 when there are none.
pub async fn get_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<String>,
) -> AppResult<Response> {
    let pool = &state.pool;
    let messages = state
        .cache
        .messages(auth.user_id, &session_id, || {
            ChatMessageRepo::list_for_session(pool, auth.user_id, &session_id)
        })
        .await?;

    if messages.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(Json(messages).into_response())
}

/// POST /api/chatHistory
///
/// Append one message and bump its session to most recently active. A
/// session that does not exist yet is created with `session_name`.
pub async fn append_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<AppendMessageRequest>,
) -> AppResult<(StatusCode, Json<AppendMessageResponse>)> {
    let role: MessageRole = require_field("role", input.role)?.parse()?;
    let create = CreateChatMessage {
        session_id: require_field("session_id", input.session_id)?,
        session_name: require_field("session_name", input.session_name)?,
        role: role.as_str().to_string(),
        content: require_field("content", input.content)?,
    };

    let appended = ChatMessageRepo::append(&state.pool, auth.user_id, &create).await?;

    tracing::debug!(
        user_id = auth.user_id,
        session_id = %appended.message.session_id,
        role = %role,
        session_created = appended.session_created,
        "Chat message stored"
    );

    state.cache.record_message(auth.user_id, &appended).await;

    Ok((
        StatusCode::CREATED,
        Json(AppendMessageResponse {
            message: appended.message,
        }),
    ))
}
