//! Route definitions for the `/chatHistory` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::chat_history;
use crate::state::AppState;

/// Routes mounted at `/chatHistory`.
///
/// ```text
/// POST /               -> append_message
/// GET  /{session_id}   -> get_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(chat_history::append_message))
        .route("/{session_id}", get(chat_history::get_history))
}
