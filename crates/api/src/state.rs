use std::sync::Arc;

use tripchat_cache::ChatCache;

use crate::config::ServerConfig;
use crate::ws::RoomHub;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already a handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tripchat_db::DbPool,
    /// Server configuration (token secrets, cookie flags, password policy).
    pub config: Arc<ServerConfig>,
    /// Cache in front of the session list and chat history.
    pub cache: Arc<ChatCache>,
    /// WebSocket chatroom connections and room membership.
    pub rooms: Arc<RoomHub>,
}
