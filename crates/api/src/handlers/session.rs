//! Handlers for the `/session` resource (the user's chat session list).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tripchat_core::error::CoreError;
use tripchat_core::validation::require_field;
use tripchat_db::models::chat_session::{CreateChatSession, SessionSummary};
use tripchat_db::repositories::ChatSessionRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /api/session`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub new_session: Option<NewSession>,
}

#[derive(Debug, Deserialize)]
pub struct NewSession {
    pub session_id: Option<String>,
    pub session_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub message: &'static str,
    pub session: SessionSummary,
}

/// GET /api/session
///
/// The caller's sessions, most recently active first. Served from the cache
/// when possible.
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<SessionSummary>>> {
    let pool = &state.pool;
    let sessions = state
        .cache
        .sessions(auth.user_id, || ChatSessionRepo::list_for_user(pool, auth.user_id))
        .await?;
    Ok(Json(sessions))
}

/// POST /api/session
///
/// Create a session. 409 if the caller already has one with this id.
pub async fn create_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<CreateSessionResponse>)> {
    let new_session = input
        .new_session
        .ok_or_else(|| CoreError::Validation("Session data is required".into()))?;
    let create = CreateChatSession {
        session_id: require_field("session_id", new_session.session_id)?,
        session_name: require_field("session_name", new_session.session_name)?,
    };

    let session = ChatSessionRepo::create(&state.pool, auth.user_id, &create).await?;
    let summary = SessionSummary::from(&session);

    tracing::info!(
        user_id = auth.user_id,
        session_id = %session.session_id,
        "Chat session created"
    );

    state.cache.record_session(auth.user_id, &summary).await;

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            message: "Session created successfully",
            session: summary,
        }),
    ))
}
