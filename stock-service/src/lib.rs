pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod store;

use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::auth::{
    require_auth, require_client_match, require_role, Role, RoleGate, TenantDirectory, TenantGate,
    TokenVerifier,
};
use service_core::middleware::security_headers::security_headers_middleware;
use tower_http::trace::TraceLayer;

use crate::config::StockConfig;
use crate::store::ItemStore;

#[derive(Clone)]
pub struct AppState {
    pub config: StockConfig,
    pub verifier: Arc<TokenVerifier>,
    pub directory: Arc<dyn TenantDirectory>,
    pub items: Arc<dyn ItemStore>,
}

/// Assemble the service router.
///
/// Every item route runs the full gate chain, in order: token verification,
/// role check, tenant check, handler. Listing is open to staff and admin;
/// creation is admin only.
pub fn build_router(state: AppState) -> Router {
    let tenant_gate = TenantGate::new(state.directory.clone());

    let read = get(handlers::items::list_items)
        .layer(from_fn_with_state(
            tenant_gate.clone(),
            require_client_match,
        ))
        .layer(from_fn_with_state(
            RoleGate::allow(&[Role::Staff, Role::Admin]),
            require_role,
        ));

    let write = post(handlers::items::create_item)
        .layer(from_fn_with_state(tenant_gate, require_client_match))
        .layer(from_fn_with_state(
            RoleGate::allow(&[Role::Admin]),
            require_role,
        ));

    let protected = Router::new()
        .route("/items", read.merge(write))
        .layer(from_fn_with_state(state.verifier.clone(), require_auth));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(protected)
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
