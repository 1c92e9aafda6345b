//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod chat_message_repo;
pub mod chat_session_repo;
pub mod user_repo;

pub use chat_message_repo::ChatMessageRepo;
pub use chat_session_repo::ChatSessionRepo;
pub use user_repo::UserRepo;
