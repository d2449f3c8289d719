//! Cross-service workflow integration tests library.
//!
//! Spawns the identity and stock services in-process on ephemeral ports,
//! backed by in-memory stores, and drives them over HTTP with `reqwest`.
//! This exercises the real wire behavior of the gate chain, including
//! remote-mode verification against a live (or dead) authority.

use std::sync::{Arc, Once};

use anyhow::{Context, Result};
use secrecy::Secret;
use serde_json::Value;
use uuid::Uuid;

use identity_service::config::{
    DatabaseConfig, Environment as IdentityEnvironment, IdentityConfig, RateLimitConfig,
    SecurityConfig, TokenConfig,
};
use identity_service::services::IdentityService;
use identity_service::store::InMemoryAccountStore;
use service_core::auth::TokenCodec;
use service_core::config::Config;
use service_core::middleware::rate_limit::create_rate_limiter;
use stock_service::config::{
    Environment as StockEnvironment, StockConfig, VerifierConfig, VerifierMode,
};
use stock_service::store::{InMemoryItemStore, InMemoryTenantDirectory};

/// Shared signing secret for every service spawned by these tests.
pub const SIGNING_SECRET: &str = "workflow-test-signing-secret";
pub const ADMIN_API_KEY: &str = "workflow-test-admin-key";

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("warn,workflow_tests=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub struct IdentityHandle {
    pub base_url: String,
    pub store: Arc<InMemoryAccountStore>,
}

pub struct StockHandle {
    pub base_url: String,
    pub directory: Arc<InMemoryTenantDirectory>,
    pub items: Arc<InMemoryItemStore>,
}

/// Spawn the identity service on an ephemeral port.
pub async fn spawn_identity() -> Result<IdentityHandle> {
    init_tracing();

    let config = IdentityConfig {
        common: Config { port: 0 },
        environment: IdentityEnvironment::Dev,
        service_name: "identity-service".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        token: TokenConfig {
            secret: Secret::new(SIGNING_SECRET.to_string()),
            ttl_hours: 8,
        },
        security: SecurityConfig {
            admin_api_key: ADMIN_API_KEY.to_string(),
        },
        rate_limit: RateLimitConfig {
            register_attempts: 1000,
            register_window_seconds: 60,
            login_attempts: 1000,
            login_window_seconds: 60,
        },
    };

    let store = Arc::new(InMemoryAccountStore::new());
    let codec = TokenCodec::new(&config.token.secret, config.token.ttl_hours)?;
    let identity = IdentityService::new(store.clone(), codec);

    let state = identity_service::AppState {
        config: config.clone(),
        store: store.clone(),
        identity,
        register_rate_limiter: create_rate_limiter(
            config.rate_limit.register_attempts,
            config.rate_limit.register_window_seconds,
        ),
        login_rate_limiter: create_rate_limiter(
            config.rate_limit.login_attempts,
            config.rate_limit.login_window_seconds,
        ),
    };

    let base_url = serve(identity_service::build_router(state)).await?;

    Ok(IdentityHandle { base_url, store })
}

/// Spawn the stock service in local verifier mode (holds the shared secret).
pub async fn spawn_stock_local() -> Result<StockHandle> {
    spawn_stock(VerifierConfig {
        mode: VerifierMode::Local,
        token_secret: Some(Secret::new(SIGNING_SECRET.to_string())),
        authority_url: None,
        verify_timeout_seconds: 8,
    })
    .await
}

/// Spawn the stock service in remote verifier mode, delegating to the given
/// authority URL.
pub async fn spawn_stock_remote(authority_url: &str, timeout_seconds: u64) -> Result<StockHandle> {
    spawn_stock(VerifierConfig {
        mode: VerifierMode::Remote,
        token_secret: None,
        authority_url: Some(authority_url.to_string()),
        verify_timeout_seconds: timeout_seconds,
    })
    .await
}

async fn spawn_stock(verifier: VerifierConfig) -> Result<StockHandle> {
    init_tracing();

    let config = StockConfig {
        common: Config { port: 0 },
        environment: StockEnvironment::Dev,
        service_name: "stock-service".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        verifier,
    };

    let directory = Arc::new(InMemoryTenantDirectory::new());
    let items = Arc::new(InMemoryItemStore::new());

    let state = stock_service::AppState {
        verifier: Arc::new(config.verifier.build()?),
        config,
        directory: directory.clone(),
        items: items.clone(),
    };

    let base_url = serve(stock_service::build_router(state)).await?;

    Ok(StockHandle {
        base_url,
        directory,
        items,
    })
}

async fn serve(app: axum::Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("Failed to bind ephemeral port")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Test service stopped");
        }
    });

    Ok(format!("http://{}", addr))
}

/// HTTP driver for the spawned services.
pub struct WorkflowClient {
    http: reqwest::Client,
    identity_url: String,
}

impl WorkflowClient {
    pub fn new(identity: &IdentityHandle) -> Self {
        Self {
            http: reqwest::Client::new(),
            identity_url: identity.base_url.clone(),
        }
    }

    pub async fn register(&self, handle: &str, secret: &str, role: &str) -> Result<(u16, Value)> {
        self.post_identity(
            "/identity/register",
            serde_json::json!({ "login_handle": handle, "secret": secret, "role": role }),
            None,
        )
        .await
    }

    pub async fn approve(&self, account_id: &str) -> Result<(u16, Value)> {
        self.post_identity(
            &format!("/identity/accounts/{}/approve", account_id),
            serde_json::json!({}),
            Some(ADMIN_API_KEY),
        )
        .await
    }

    pub async fn grant_membership(&self, account_id: &str, client_id: Uuid) -> Result<(u16, Value)> {
        self.post_identity(
            &format!("/identity/accounts/{}/clients/{}", account_id, client_id),
            serde_json::json!({}),
            Some(ADMIN_API_KEY),
        )
        .await
    }

    pub async fn login(&self, handle: &str, secret: &str) -> Result<(u16, Value)> {
        self.post_identity(
            "/identity/login",
            serde_json::json!({ "login_handle": handle, "secret": secret }),
            None,
        )
        .await
    }

    pub async fn verify(&self, token: &str) -> Result<(u16, Value)> {
        self.post_identity(
            "/identity/verify",
            serde_json::json!({ "token": token }),
            None,
        )
        .await
    }

    /// Register, approve, optionally grant a tenant membership, and log in.
    /// Returns the session token.
    pub async fn provision_account(
        &self,
        handle: &str,
        role: &str,
        client_id: Option<Uuid>,
    ) -> Result<String> {
        let (status, body) = self.register(handle, "workflow-secret-1", role).await?;
        anyhow::ensure!(status == 201, "register failed: {} {}", status, body);
        let account_id = body["account_id"]
            .as_str()
            .context("register response missing account_id")?
            .to_string();

        let (status, _) = self.approve(&account_id).await?;
        anyhow::ensure!(status == 200, "approve failed: {}", status);

        if let Some(client_id) = client_id {
            let (status, _) = self.grant_membership(&account_id, client_id).await?;
            anyhow::ensure!(status == 200, "membership grant failed: {}", status);
        }

        let (status, body) = self.login(handle, "workflow-secret-1").await?;
        anyhow::ensure!(status == 200, "login failed: {} {}", status, body);
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response missing token")
    }

    pub async fn list_items(&self, stock: &StockHandle, token: Option<&str>) -> Result<(u16, Value)> {
        let mut req = self.http.get(format!("{}/items", stock.base_url));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        response_parts(req.send().await?).await
    }

    pub async fn create_item(
        &self,
        stock: &StockHandle,
        token: &str,
        body: Value,
    ) -> Result<(u16, Value)> {
        let response = self
            .http
            .post(format!("{}/items", stock.base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        response_parts(response).await
    }

    async fn post_identity(
        &self,
        path: &str,
        body: Value,
        admin_key: Option<&str>,
    ) -> Result<(u16, Value)> {
        let mut req = self
            .http
            .post(format!("{}{}", self.identity_url, path))
            .json(&body);
        if let Some(key) = admin_key {
            req = req.header("X-Admin-Api-Key", key);
        }
        response_parts(req.send().await?).await
    }
}

async fn response_parts(response: reqwest::Response) -> Result<(u16, Value)> {
    let status = response.status().as_u16();
    let bytes = response.bytes().await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    Ok((status, value))
}
