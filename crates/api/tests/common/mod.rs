#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use tripchat_api::auth::jwt::JwtConfig;
use tripchat_api::config::ServerConfig;
use tripchat_api::router::build_app_router;
use tripchat_api::state::AppState;
use tripchat_api::ws::RoomHub;
use tripchat_cache::{CacheConfig, ChatCache, MemoryCache};

/// Build a test `ServerConfig` with safe defaults and fixed token secrets.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        refresh_cookie_secure: true,
        min_password_length: 8,
        jwt: JwtConfig {
            access_secret: "test-access-secret".to_string(),
            refresh_secret: "test-refresh-secret".to_string(),
            access_token_expiry_mins: 30,
            refresh_token_expiry_hours: 24,
        },
        cache: CacheConfig::default(),
    }
}

/// Build the application state over an in-process cache.
pub fn test_state(pool: PgPool, store: Arc<MemoryCache>) -> AppState {
    let config = test_config();
    let cache = ChatCache::new(store, config.cache.clone());
    AppState {
        pool,
        config: Arc::new(config),
        cache: Arc::new(cache),
        rooms: Arc::new(RoomHub::new()),
    }
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(test_state(pool, Arc::new(MemoryCache::new())))
}

/// Like [`build_test_app`], also returning the cache backend for inspection.
pub fn build_test_app_with_cache(pool: PgPool) -> (Router, Arc<MemoryCache>) {
    let store = Arc::new(MemoryCache::new());
    let app = build_app_router(test_state(pool, store.clone()));
    (app, store)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// GET with a `jwt` refresh cookie.
pub async fn get_with_cookie(app: Router, uri: &str, refresh_token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(COOKIE, format!("jwt={refresh_token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_is_empty(response: Response) -> bool {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .is_empty()
}

/// The raw `Set-Cookie` header of a response.
pub fn set_cookie_header(response: &Response) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string())
}

/// The `jwt` cookie value set by a response.
pub fn refresh_cookie_value(response: &Response) -> Option<String> {
    let header = set_cookie_header(response)?;
    let first = header.split(';').next()?;
    first.strip_prefix("jwt=").map(str::to_string)
}

// ---------------------------------------------------------------------------
// Flow helpers
// ---------------------------------------------------------------------------

pub async fn register(app: Router, username: &str, password: &str) -> Response {
    post_json(
        app,
        "/api/register",
        serde_json::json!({ "user": username, "pwd": password }),
    )
    .await
}

pub async fn login(app: Router, username: &str, password: &str) -> Response {
    post_json(
        app,
        "/api/auth",
        serde_json::json!({ "user": username, "pwd": password }),
    )
    .await
}

/// Register and log in, returning `(access_token, refresh_token)`.
pub async fn register_and_login(app: &Router, username: &str, password: &str) -> (String, String) {
    let response = register(app.clone(), username, password).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = login(app.clone(), username, password).await;
    assert_eq!(response.status(), StatusCode::OK);
    let refresh = refresh_cookie_value(&response).expect("login must set the jwt cookie");
    let json = body_json(response).await;
    let access = json["accessToken"].as_str().unwrap().to_string();
    (access, refresh)
}
