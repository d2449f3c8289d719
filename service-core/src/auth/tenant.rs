use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::claims::IdentityClaims;
use crate::error::AppError;

/// Tenant references are carried in small JSON bodies; anything larger is
/// not something this gate should buffer.
const BODY_LIMIT: usize = 1024 * 1024;

/// Membership lookup: may `account_id` act on behalf of `client_id`?
///
/// This relationship table is the source of truth for tenant access. The
/// token's `client_id` claim is the identity's default scope and a fast
/// path, not an authorization record of its own.
#[async_trait::async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn is_member(&self, account_id: Uuid, client_id: Uuid) -> Result<bool, AppError>;
}

/// Tenant gate: enforces that the client referenced by a request is one the
/// identity may act for.
#[derive(Clone)]
pub struct TenantGate {
    directory: Arc<dyn TenantDirectory>,
}

impl TenantGate {
    pub fn new(directory: Arc<dyn TenantDirectory>) -> Self {
        Self { directory }
    }

    async fn admit(
        &self,
        claims: &IdentityClaims,
        requested: Option<Uuid>,
    ) -> Result<(), AppError> {
        let scope = claims.client_id.ok_or_else(|| {
            AppError::TenantMismatch("identity carries no client scope".to_string())
        })?;

        match requested {
            // Tenant context supplied implicitly by the identity.
            None => Ok(()),
            Some(requested) if requested == scope => Ok(()),
            Some(requested) => {
                if self.directory.is_member(claims.sub, requested).await? {
                    Ok(())
                } else {
                    Err(AppError::TenantMismatch(format!(
                        "identity is not a member of client {}",
                        requested
                    )))
                }
            }
        }
    }
}

/// Middleware form of the tenant gate.
///
/// Runs after `require_auth`. Inspects query parameters and JSON bodies for
/// a `client_id` reference; the body is re-attached untouched for the
/// handler.
pub async fn require_client_match(
    State(gate): State<TenantGate>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();

    let claims = parts
        .extensions
        .get::<IdentityClaims>()
        .cloned()
        .ok_or(AppError::Unauthenticated)?;

    let mut requested = client_id_from_query(parts.uri.query())?;

    let bytes = to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read body: {}", e)))?;

    if requested.is_none() {
        let is_json = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);

        if is_json && !bytes.is_empty() {
            requested = client_id_from_json(&bytes)?;
        }
    }

    gate.admit(&claims, requested).await?;

    let req = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(req).await)
}

fn client_id_from_query(query: Option<&str>) -> Result<Option<Uuid>, AppError> {
    let Some(query) = query else {
        return Ok(None);
    };

    let params: HashMap<String, String> = serde_urlencoded::from_str(query)
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid query string: {}", e)))?;

    params
        .get("client_id")
        .map(|raw| {
            raw.parse::<Uuid>()
                .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid client_id: {}", raw)))
        })
        .transpose()
}

fn client_id_from_json(bytes: &[u8]) -> Result<Option<Uuid>, AppError> {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(bytes) else {
        // Malformed JSON is the handler's problem to reject, not the gate's.
        return Ok(None);
    };

    value
        .get("client_id")
        .and_then(|v| v.as_str())
        .map(|raw| {
            raw.parse::<Uuid>()
                .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid client_id: {}", raw)))
        })
        .transpose()
}
