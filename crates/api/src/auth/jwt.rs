//! Access and refresh token generation/validation.
//!
//! Both tokens are HS256-signed JWTs, each with its own secret. The access
//! token carries the user id and username; the refresh token carries only the
//! username. The server keeps the SHA-256 digest of the most recently issued
//! refresh token on the user row, so a refresh token is honoured only while it
//! is the one on record.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tripchat_core::types::DbId;
use uuid::Uuid;

/// Claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    pub username: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

/// Claims embedded in every refresh token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub username: String,
    pub exp: i64,
    pub iat: i64,
    /// Makes two tokens issued within the same second distinct.
    pub jti: String,
}

/// Configuration for token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret for access tokens.
    pub access_secret: String,
    /// HMAC-SHA256 secret for refresh tokens.
    pub refresh_secret: String,
    /// Access token lifetime in minutes (default: 30).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in hours (default: 24).
    pub refresh_token_expiry_hours: i64,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 30;
/// Default refresh token expiry in hours.
const DEFAULT_REFRESH_EXPIRY_HOURS: i64 = 24;

impl JwtConfig {
    /// Load token configuration from environment variables.
    ///
    /// | Env Var                      | Required | Default |
    /// |------------------------------|----------|---------|
    /// | `ACCESS_TOKEN_SECRET`        | **yes**  | --      |
    /// | `REFRESH_TOKEN_SECRET`       | **yes**  | --      |
    /// | `ACCESS_TOKEN_EXPIRY_MINS`   | no       | `30`    |
    /// | `REFRESH_TOKEN_EXPIRY_HOURS` | no       | `24`    |
    ///
    /// # Panics
    ///
    /// Panics if either secret is not set or is empty.
    pub fn from_env() -> Self {
        let access_secret = std::env::var("ACCESS_TOKEN_SECRET")
            .expect("ACCESS_TOKEN_SECRET must be set in the environment");
        assert!(!access_secret.is_empty(), "ACCESS_TOKEN_SECRET must not be empty");

        let refresh_secret = std::env::var("REFRESH_TOKEN_SECRET")
            .expect("REFRESH_TOKEN_SECRET must be set in the environment");
        assert!(!refresh_secret.is_empty(), "REFRESH_TOKEN_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("ACCESS_TOKEN_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("ACCESS_TOKEN_EXPIRY_MINS must be a valid i64");

        let refresh_token_expiry_hours: i64 = std::env::var("REFRESH_TOKEN_EXPIRY_HOURS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_HOURS.to_string())
            .parse()
            .expect("REFRESH_TOKEN_EXPIRY_HOURS must be a valid i64");

        Self {
            access_secret,
            refresh_secret,
            access_token_expiry_mins,
            refresh_token_expiry_hours,
        }
    }

    /// Refresh token lifetime in seconds, used for the cookie `Max-Age`.
    pub fn refresh_token_max_age_secs(&self) -> i64 {
        self.refresh_token_expiry_hours * 3600
    }
}

/// Generate an HS256 access token for the given user.
pub fn generate_access_token(
    user_id: DbId,
    username: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = AccessClaims {
        sub: user_id,
        username: username.to_string(),
        exp: now + config.access_token_expiry_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.access_secret.as_bytes()),
    )
}

/// Validate and decode an access token, returning the embedded [`AccessClaims`].
///
/// Checks the signature and expiration.
pub fn validate_access_token(
    token: &str,
    config: &JwtConfig,
) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.access_secret.as_bytes()),
        &strict_validation(),
    )?;
    Ok(token_data.claims)
}

/// Generate an HS256 refresh token for the given username.
pub fn generate_refresh_token(
    username: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = RefreshClaims {
        username: username.to_string(),
        exp: now + config.refresh_token_max_age_secs(),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.refresh_secret.as_bytes()),
    )
}

/// Validate and decode a refresh token, returning the embedded [`RefreshClaims`].
pub fn validate_refresh_token(
    token: &str,
    config: &JwtConfig,
) -> Result<RefreshClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(config.refresh_secret.as_bytes()),
        &strict_validation(),
    )?;
    Ok(token_data.claims)
}

/// HS256 with signature and `exp` checks and no clock leeway.
fn strict_validation() -> Validation {
    let mut validation = Validation::default();
    validation.leeway = 0;
    validation
}

/// Compute the SHA-256 hex digest of a refresh token.
///
/// Only this digest is persisted; an incoming token is hashed and compared.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
