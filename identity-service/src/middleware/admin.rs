use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;
use subtle::ConstantTimeEq;

use crate::AppState;

/// Guard for administrative routes (approval, membership, deletion).
///
/// These are operator actions outside the steady-state request path, keyed
/// by a deployment-provided API key rather than a session token. The key is
/// compared in constant time.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorized = headers
        .get("X-Admin-Api-Key")
        .and_then(|value| value.to_str().ok())
        .map(|key| {
            key.as_bytes()
                .ct_eq(state.config.security.admin_api_key.as_bytes())
                .into()
        })
        .unwrap_or(false);

    if authorized {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Failed admin authentication attempt");
        Err(AppError::InvalidCredentials)
    }
}
