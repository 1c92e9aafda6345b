//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row plus the DTOs used to insert it.

pub mod chat_message;
pub mod chat_session;
pub mod user;
