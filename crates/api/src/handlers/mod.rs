pub mod auth;
pub mod chat_history;
pub mod session;
pub mod user;
