#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use rmc_api::auth::session::SessionConfig;
use rmc_api::config::{LandingMode, ServerConfig};
use rmc_api::router::build_app_router;
use rmc_api::state::AppState;
use rmc_core::suggestion::ConsensusPolicy;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_INVITE_CODE: &str = "cleared-for-takeoff";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        session: SessionConfig {
            secret: "test-session-secret".to_string(),
            expiry_hours: 1,
            invite_code: TEST_INVITE_CODE.to_string(),
        },
        reviewer_pepper: "test-pepper".to_string(),
        landing_mode: LandingMode::Public,
        secure_cookies: false,
        min_display_reviews: 3,
        review_cooldown: Duration::hours(24),
        consensus: ConsensusPolicy::default(),
    }
}

/// Build the full application router (same middleware stack as production)
/// for the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

/// Like [`build_test_app`] but with a custom configuration.
pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Send a request, optionally with a `Cookie` header.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    cookies: &[String],
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if !cookies.is_empty() {
        builder = builder.header(COOKIE, cookies.join("; "));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, &[]).await
}

pub async fn get_with(app: Router, uri: &str, cookies: &[String]) -> Response<Body> {
    send(app, Method::GET, uri, None, cookies).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), &[]).await
}

pub async fn post_json_with(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    cookies: &[String],
) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), cookies).await
}

/// Read and parse a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Cookies
// ---------------------------------------------------------------------------

/// All `Set-Cookie` header values on a response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// The `name=value` pair of the `Set-Cookie` for `name`, if any.
pub fn cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with(&format!("{name}=")))
        .map(|c| c.split(';').next().unwrap_or_default().to_string())
}

/// Log in with the test invite code and return the session cookie pair.
pub async fn login(app: Router) -> String {
    let response = post_json(
        app,
        "/login",
        serde_json::json!({ "code": TEST_INVITE_CODE }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    cookie_pair(&response, "rmc_session").expect("login must set the session cookie")
}

/// A fixed reviewer token cookie, so tests control reviewer identity.
pub fn reviewer(token: &str) -> String {
    format!("rmc_reviewer={token}")
}
