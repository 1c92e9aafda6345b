//! Handlers for registration and the token lifecycle (login, refresh, logout).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tripchat_core::error::CoreError;
use tripchat_core::validation::{require_field, validate_password_strength};
use tripchat_db::models::user::CreateUser;
use tripchat_db::repositories::UserRepo;

use crate::auth::cookie::{clear_refresh_cookie, refresh_cookie, refresh_token_from_headers};
use crate::auth::jwt::{
    generate_access_token, generate_refresh_token, hash_refresh_token, validate_refresh_token,
};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/register` and `POST /api/auth`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub user: Option<String>,
    pub pwd: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: String,
}

/// Returned by login and refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/register
///
/// Create a user. Returns 201, or 409 when the username is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let (username, password) = credentials(input)?;
    validate_password_strength(&password, state.config.min_password_length)?;

    if UserRepo::find_by_username(&state.pool, &username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Username '{username}' is already taken"
        ))));
    }

    let password_hash = hash_password(&password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // A concurrent registration of the same name still fails on
    // `uq_users_username`, which maps to 409.
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: username.clone(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: format!("New user {username} created!"),
        }),
    ))
}

/// POST /api/auth
///
/// Verify credentials, issue an access token in the body and a refresh token
/// in the `jwt` cookie. The refresh token's digest replaces any previous one,
/// which revokes the user's earlier refresh token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> AppResult<Response> {
    let (username, password) = credentials(input)?;

    let user = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid username or password"))?;

    let password_valid = verify_password(&password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = user.id, "Login rejected: wrong password");
        return Err(AppError::unauthorized("Invalid username or password"));
    }

    let jwt = &state.config.jwt;
    let access_token = generate_access_token(user.id, &user.username, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let refresh_token = generate_refresh_token(&user.username, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    UserRepo::set_refresh_token_hash(&state.pool, user.id, &hash_refresh_token(&refresh_token))
        .await?;

    let cookie = refresh_cookie(
        &refresh_token,
        jwt.refresh_token_max_age_secs(),
        state.config.refresh_cookie_secure,
    )
    .map_err(|e| AppError::InternalError(format!("Cookie encoding error: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(AccessTokenResponse { access_token }),
    )
        .into_response())
}

/// GET /api/refresh
///
/// Exchange the refresh cookie for a new access token. The refresh token is
/// not rotated and stays usable until it expires or is replaced.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<AccessTokenResponse>> {
    let token = refresh_token_from_headers(&headers)
        .ok_or_else(|| AppError::unauthorized("Missing refresh token"))?;

    let claims = validate_refresh_token(&token, &state.config.jwt)
        .map_err(|_| AppError::forbidden("Invalid or expired refresh token"))?;

    let user = UserRepo::find_by_username(&state.pool, &claims.username)
        .await?
        .ok_or_else(|| AppError::forbidden("Invalid or expired refresh token"))?;

    let presented = hash_refresh_token(&token);
    if user.refresh_token_hash.as_deref() != Some(presented.as_str()) {
        tracing::debug!(user_id = user.id, "Refresh rejected: token revoked or superseded");
        return Err(AppError::forbidden("Invalid or expired refresh token"));
    }

    let access_token = generate_access_token(user.id, &user.username, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(Json(AccessTokenResponse { access_token }))
}

/// GET /api/logout
///
/// Revoke the presented refresh token and clear the cookie. The token is
/// matched by value, never decoded. Always 204, even when the store cannot
/// be reached.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = refresh_token_from_headers(&headers) {
        match UserRepo::clear_refresh_token_hash(&state.pool, &hash_refresh_token(&token)).await {
            Ok(Some(user_id)) => tracing::info!(user_id, "User logged out"),
            Ok(None) => tracing::debug!("Logout with an unknown refresh token"),
            Err(e) => tracing::error!(error = %e, "Failed to revoke refresh token on logout"),
        }
    }

    let cookie = clear_refresh_cookie(state.config.refresh_cookie_secure);
    (StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]).into_response()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn credentials(input: CredentialsRequest) -> Result<(String, String), CoreError> {
    let user = require_field("user", input.user)
        .map_err(|_| CoreError::Validation("Username and password are required".into()))?;
    let pwd = require_field("pwd", input.pwd)
        .map_err(|_| CoreError::Validation("Username and password are required".into()))?;
    Ok((user, pwd))
}
