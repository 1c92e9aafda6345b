//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tripchat_core::types::DbId;
use tripchat_db::repositories::UserRepo;

use crate::auth::jwt::validate_access_token;
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated caller, resolved from a Bearer access token.
///
/// The user row is re-read on every request, so a token whose user was
/// removed or renamed stops working before it expires.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub username: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                AppError::forbidden("Invalid Authorization format. Expected: Bearer <token>")
            })?;

        let claims = validate_access_token(token, &state.config.jwt)
            .map_err(|_| AppError::forbidden("Invalid or expired token"))?;

        let user = UserRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .filter(|u| u.username == claims.username)
            .ok_or_else(|| {
                tracing::debug!(user_id = claims.sub, "Token subject no longer matches a user");
                AppError::forbidden("Invalid or expired token")
            })?;

        Ok(AuthUser {
            user_id: user.id,
            username: user.username,
        })
    }
}
