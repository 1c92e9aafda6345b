//! The `jwt` refresh-token cookie.
//!
//! The cookie is http-only and, when secure, cross-site (`SameSite=None`).
//! Browsers reject `SameSite=None` without `Secure`, so a non-secure cookie
//! (local development over plain HTTP) falls back to `SameSite=Lax`.

use axum::http::header::{self, HeaderMap, HeaderValue, InvalidHeaderValue};

/// Name of the cookie holding the refresh token.
pub const REFRESH_COOKIE_NAME: &str = "jwt";

/// Build the `Set-Cookie` value that stores `token` for `max_age_secs`.
pub fn refresh_cookie(
    token: &str,
    max_age_secs: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{REFRESH_COOKIE_NAME}={token}; Path=/; HttpOnly{}; Max-Age={max_age_secs}",
        cross_site_attrs(secure)
    ))
}

/// Build the `Set-Cookie` value that removes the refresh cookie.
pub fn clear_refresh_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static("jwt=; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=0")
    } else {
        HeaderValue::from_static("jwt=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

/// The refresh token from the request's `Cookie` header, if present and
/// non-empty.
pub fn refresh_token_from_headers(headers: &HeaderMap) -> Option<String> {
    extract_cookie_value(headers, REFRESH_COOKIE_NAME).filter(|v| !v.is_empty())
}

fn cross_site_attrs(secure: bool) -> &'static str {
    if secure {
        "; Secure; SameSite=None"
    } else {
        "; SameSite=Lax"
    }
}

fn extract_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .map(str::trim)
        .find_map(|part| part.strip_prefix(&prefix).map(str::to_string))
}
