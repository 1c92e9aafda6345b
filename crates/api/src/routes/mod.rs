pub mod auth;
pub mod chat_history;
pub mod health;
pub mod session;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /register                    create user (public)
/// /auth                        login (public)
/// /refresh                     new access token from cookie (public)
/// /logout                      revoke refresh token (public)
///
/// /session                     list, create (auth required)
/// /chatHistory                 append message (auth required)
/// /chatHistory/{session_id}    session history (auth required)
/// /user                        list users (auth required)
/// /user/{id}                   get user (auth required)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Registration and token lifecycle.
        .merge(auth::router())
        // Chat sessions and history.
        .nest("/session", session::router())
        .nest("/chatHistory", chat_history::router())
        // Users.
        .nest("/user", user::router())
}
