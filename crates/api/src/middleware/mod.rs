//! Request extractors that gate protected routes.
//!
//! - [`auth::AuthUser`] -- the caller resolved from a Bearer access token.

pub mod auth;
