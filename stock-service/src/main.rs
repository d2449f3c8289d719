use std::net::SocketAddr;
use std::sync::Arc;

use service_core::observability::init_tracing;
use stock_service::{
    build_router,
    config::StockConfig,
    store::{InMemoryItemStore, InMemoryTenantDirectory},
    AppState,
};
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = StockConfig::from_env()?;

    init_tracing(&config.service_name, &config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        verifier_mode = ?config.verifier.mode,
        "Starting stock service"
    );

    let verifier = Arc::new(config.verifier.build()?);

    // Cross-tenant grants are administered by the identity service; this
    // deployment admits only the token's own client scope.
    let directory = Arc::new(InMemoryTenantDirectory::new());
    let items = Arc::new(InMemoryItemStore::new());

    let state = AppState {
        config: config.clone(),
        verifier,
        directory,
        items,
    };

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
