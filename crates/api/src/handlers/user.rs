//! Handlers for the `/user` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tripchat_core::types::DbId;
use tripchat_db::models::user::UserResponse;
use tripchat_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/user
///
/// All users, newest first; 204 when there are none.
pub async fn list_users(State(state): State<AppState>, _auth: AuthUser) -> AppResult<Response> {
    let users: Vec<UserResponse> = UserRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    if users.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(Json(users).into_response())
}

/// GET /api/user/{id}
///
/// 400 for a non-numeric id, 204 for an unknown one.
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id: DbId = id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid user id '{id}'")))?;

    match UserRepo::find_by_id(&state.pool, id).await? {
        Some(user) => Ok(Json(UserResponse::from(user)).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}
