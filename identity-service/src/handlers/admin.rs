use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::AppState;

/// Approve a pending account.
pub async fn approve_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.identity.approve(account_id).await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Account approved" })),
    ))
}

/// Grant an account access to a client.
pub async fn grant_membership(
    State(state): State<AppState>,
    Path((account_id, client_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    state.identity.grant_membership(account_id, client_id).await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Membership granted" })),
    ))
}

/// Delete an account and its memberships.
pub async fn delete_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.identity.remove(account_id).await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Account deleted" })),
    ))
}
