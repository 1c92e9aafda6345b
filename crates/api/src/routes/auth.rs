//! Route definitions for registration and the token lifecycle.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Public routes mounted directly under `/api`.
///
/// ```text
/// POST /register  -> register
/// POST /auth      -> login
/// GET  /refresh   -> refresh (cookie)
/// GET  /logout    -> logout (cookie)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/auth", post(auth::login))
        .route("/refresh", get(auth::refresh))
        .route("/logout", get(auth::logout))
}
