//! Test helpers for stock-service integration tests.
//!
//! The router runs in local verifier mode over in-memory stores and is
//! exercised with `tower::ServiceExt::oneshot`; tokens are minted directly
//! with the shared test secret.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use service_core::auth::{Role, TokenCodec};
use service_core::config::Config;
use stock_service::{
    build_router,
    config::{Environment, StockConfig, VerifierConfig, VerifierMode},
    store::{InMemoryItemStore, InMemoryTenantDirectory},
    AppState,
};
use tower::util::ServiceExt;
use uuid::Uuid;

pub const TEST_SIGNING_SECRET: &str = "integration-test-signing-secret";

pub struct TestApp {
    pub router: Router,
    pub directory: Arc<InMemoryTenantDirectory>,
    pub items: Arc<InMemoryItemStore>,
    pub codec: TokenCodec,
}

pub fn test_config() -> StockConfig {
    StockConfig {
        common: Config { port: 0 },
        environment: Environment::Dev,
        service_name: "stock-service".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        verifier: VerifierConfig {
            mode: VerifierMode::Local,
            token_secret: Some(Secret::new(TEST_SIGNING_SECRET.to_string())),
            authority_url: None,
            verify_timeout_seconds: 8,
        },
    }
}

pub fn spawn_app() -> TestApp {
    let config = test_config();
    let verifier = Arc::new(config.verifier.build().expect("Failed to build verifier"));
    let directory = Arc::new(InMemoryTenantDirectory::new());
    let items = Arc::new(InMemoryItemStore::new());

    let state = AppState {
        config,
        verifier,
        directory: directory.clone(),
        items: items.clone(),
    };

    let codec = TokenCodec::new(&Secret::new(TEST_SIGNING_SECRET.to_string()), 8)
        .expect("Failed to create codec");

    TestApp {
        router: build_router(state),
        directory,
        items,
        codec,
    }
}

pub fn token_for(app: &TestApp, role: Role, client_id: Option<Uuid>) -> String {
    app.codec
        .issue(Uuid::new_v4(), "tester", role, client_id)
        .expect("Failed to issue token")
}

pub async fn get(
    router: &Router,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    send(router, builder.body(Body::empty()).unwrap()).await
}

pub async fn post_json(
    router: &Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    send(router, builder.body(Body::from(body.to_string())).unwrap()).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}
