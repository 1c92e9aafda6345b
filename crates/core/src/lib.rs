//! Domain primitives shared by every tripchat crate.

pub mod chat;
pub mod error;
pub mod types;
pub mod validation;
