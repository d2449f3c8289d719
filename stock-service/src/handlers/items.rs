use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::auth::AuthUser;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{CreateItemRequest, ItemResponse, ListItemsQuery, ListItemsResponse},
    models::Item,
    AppState,
};

/// List items for a client scope. Staff and admin.
pub async fn list_items(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<ListItemsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let client_id = resolve_scope(query.client_id, claims.client_id)?;

    let items = state
        .items
        .list_items(client_id)
        .await
        .map_err(AppError::DatabaseError)?;

    Ok((
        StatusCode::OK,
        Json(ListItemsResponse {
            items: items.into_iter().map(ItemResponse::from).collect(),
        }),
    ))
}

/// Create an item. Admin only.
pub async fn create_item(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let client_id = resolve_scope(req.client_id, claims.client_id)?;

    let item = Item::new(client_id, req.name, req.quantity);
    state
        .items
        .insert_item(&item)
        .await
        .map_err(AppError::DatabaseError)?;

    tracing::info!(item_id = %item.item_id, client_id = %client_id, "Item created");

    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))))
}

/// The tenant gate has already admitted the request; this only picks the
/// effective scope for the store call.
fn resolve_scope(requested: Option<Uuid>, claim_scope: Option<Uuid>) -> Result<Uuid, AppError> {
    requested.or(claim_scope).ok_or_else(|| {
        AppError::TenantMismatch("identity carries no client scope".to_string())
    })
}
