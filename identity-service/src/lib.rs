pub mod config;
pub mod db;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use service_core::middleware::rate_limit::{rate_limit_middleware, EndpointRateLimiter};
use service_core::middleware::security_headers::security_headers_middleware;
use tower_http::trace::TraceLayer;

use crate::config::IdentityConfig;
use crate::services::IdentityService;
use crate::store::AccountStore;

#[derive(Clone)]
pub struct AppState {
    pub config: IdentityConfig,
    pub store: Arc<dyn AccountStore>,
    pub identity: IdentityService,
    pub register_rate_limiter: EndpointRateLimiter,
    pub login_rate_limiter: EndpointRateLimiter,
}

/// Assemble the service router.
///
/// Public identity routes carry per-endpoint rate limits; administrative
/// routes sit behind the admin API key guard.
pub fn build_router(state: AppState) -> Router {
    let register_limiter = state.register_rate_limiter.clone();
    let login_limiter = state.login_rate_limiter.clone();

    let register_routes = Router::new()
        .route("/identity/register", post(handlers::identity::register))
        .layer(from_fn(move |req, next| {
            rate_limit_middleware(register_limiter.clone(), req, next)
        }));

    let login_routes = Router::new()
        .route("/identity/login", post(handlers::identity::login))
        .layer(from_fn(move |req, next| {
            rate_limit_middleware(login_limiter.clone(), req, next)
        }));

    let admin_routes = Router::new()
        .route(
            "/identity/accounts/:account_id/approve",
            post(handlers::admin::approve_account),
        )
        .route(
            "/identity/accounts/:account_id/clients/:client_id",
            post(handlers::admin::grant_membership),
        )
        .route(
            "/identity/accounts/:account_id",
            delete(handlers::admin::delete_account),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::admin_auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/identity/verify", post(handlers::identity::verify))
        .merge(register_routes)
        .merge(login_routes)
        .merge(admin_routes)
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
