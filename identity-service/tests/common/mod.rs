//! Test helpers for identity-service integration tests.
//!
//! Routers are exercised in-process with `tower::ServiceExt::oneshot` over an
//! in-memory credential store; no database or network is required.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use identity_service::{
    build_router,
    config::{
        DatabaseConfig, Environment, IdentityConfig, RateLimitConfig, SecurityConfig, TokenConfig,
    },
    services::IdentityService,
    store::InMemoryAccountStore,
    AppState,
};
use secrecy::Secret;
use service_core::auth::TokenCodec;
use service_core::config::Config;
use service_core::middleware::rate_limit::create_rate_limiter;
use tower::util::ServiceExt;

pub const TEST_SIGNING_SECRET: &str = "integration-test-signing-secret";
pub const TEST_ADMIN_API_KEY: &str = "test-admin-key-12345";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryAccountStore>,
    pub identity: IdentityService,
}

pub fn test_config(register_attempts: u32) -> IdentityConfig {
    IdentityConfig {
        common: Config { port: 0 },
        environment: Environment::Dev,
        service_name: "identity-service".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        token: TokenConfig {
            secret: Secret::new(TEST_SIGNING_SECRET.to_string()),
            ttl_hours: 8,
        },
        security: SecurityConfig {
            admin_api_key: TEST_ADMIN_API_KEY.to_string(),
        },
        rate_limit: RateLimitConfig {
            register_attempts,
            register_window_seconds: 60,
            login_attempts: 100,
            login_window_seconds: 60,
        },
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_register_limit(100)
}

pub fn spawn_app_with_register_limit(register_attempts: u32) -> TestApp {
    let config = test_config(register_attempts);
    let store = Arc::new(InMemoryAccountStore::new());
    let codec = TokenCodec::new(&config.token.secret, config.token.ttl_hours)
        .expect("Failed to create codec");
    let identity = IdentityService::new(store.clone(), codec);

    let state = AppState {
        config: config.clone(),
        store: store.clone(),
        identity: identity.clone(),
        register_rate_limiter: create_rate_limiter(
            config.rate_limit.register_attempts,
            config.rate_limit.register_window_seconds,
        ),
        login_rate_limiter: create_rate_limiter(
            config.rate_limit.login_attempts,
            config.rate_limit.login_window_seconds,
        ),
    };

    TestApp {
        router: build_router(state),
        store,
        identity,
    }
}

pub async fn post_json(
    router: &Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    post_json_with_headers(router, uri, body, &[]).await
}

pub async fn post_json_with_headers(
    router: &Router,
    uri: &str,
    body: serde_json::Value,
    headers: &[(&str, &str)],
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let response = router
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

pub async fn register(router: &Router, handle: &str, secret: &str, role: &str) -> serde_json::Value {
    let (status, body) = post_json(
        router,
        "/identity/register",
        serde_json::json!({ "login_handle": handle, "secret": secret, "role": role }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

pub async fn approve(router: &Router, account_id: &str) {
    let (status, _) = post_json_with_headers(
        router,
        &format!("/identity/accounts/{}/approve", account_id),
        serde_json::json!({}),
        &[("X-Admin-Api-Key", TEST_ADMIN_API_KEY)],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

pub async fn login(router: &Router, handle: &str, secret: &str) -> (StatusCode, serde_json::Value) {
    post_json(
        router,
        "/identity/login",
        serde_json::json!({ "login_handle": handle, "secret": secret }),
    )
    .await
}
