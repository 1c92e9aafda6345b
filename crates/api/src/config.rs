use tripchat_cache::CacheConfig;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the token secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Whether the refresh cookie carries the `Secure` attribute (default: `true`).
    pub refresh_cookie_secure: bool,
    /// Minimum accepted password length at registration (default: `8`).
    pub min_password_length: usize,
    /// Token secrets and lifetimes.
    pub jwt: JwtConfig,
    /// Cache backend and entry lifetimes.
    pub cache: CacheConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `REFRESH_COOKIE_SECURE` | `true`                     |
    /// | `MIN_PASSWORD_LENGTH`   | `8`                        |
    ///
    /// Token settings are read by [`JwtConfig::from_env`], cache settings by
    /// [`CacheConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let refresh_cookie_secure: bool = std::env::var("REFRESH_COOKIE_SECURE")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("REFRESH_COOKIE_SECURE must be `true` or `false`");

        let min_password_length: usize = std::env::var("MIN_PASSWORD_LENGTH")
            .unwrap_or_else(|_| "8".into())
            .parse()
            .expect("MIN_PASSWORD_LENGTH must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            refresh_cookie_secure,
            min_password_length,
            jwt: JwtConfig::from_env(),
            cache: CacheConfig::from_env(),
        }
    }
}
