use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::auth::VerifyResponse;
use service_core::error::AppError;

use crate::{
    dtos::{LoginRequest, RegisterRequest, VerifyRequest},
    utils::ValidatedJson,
    AppState,
};

/// Register a new account. Never returns a token.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.identity.register(req).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

/// Login with handle and secret, returning a session token.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.identity.login(req).await?;
    Ok((StatusCode::OK, Json(res)))
}

/// Verify a session token on behalf of a remote service.
///
/// This is the endpoint remote-mode verification adapters call.
pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let claims = state.identity.verify(&req.token)?;
    Ok((StatusCode::OK, Json(VerifyResponse { claims })))
}
