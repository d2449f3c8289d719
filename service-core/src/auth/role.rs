use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::claims::{IdentityClaims, Role};
use crate::error::AppError;

/// Role gate: admits a request only when the verified identity's role is in
/// the allowed set.
///
/// The allowed set is fixed at construction. Case handling lives entirely at
/// the [`Role`] parse boundary, so the check here is plain set membership
/// with no I/O.
#[derive(Clone)]
pub struct RoleGate {
    allowed: Arc<HashSet<Role>>,
}

impl RoleGate {
    pub fn allow(roles: &[Role]) -> Self {
        Self {
            allowed: Arc::new(roles.iter().copied().collect()),
        }
    }

    pub fn check(&self, role: Role) -> Result<(), AppError> {
        if self.allowed.contains(&role) {
            Ok(())
        } else {
            Err(AppError::InsufficientRole)
        }
    }
}

/// Middleware form of the role gate.
///
/// Must run after `require_auth`; absent claims indicate a service wiring
/// bug, not a client fault.
pub async fn require_role(
    State(gate): State<RoleGate>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = req
        .extensions()
        .get::<IdentityClaims>()
        .ok_or(AppError::Unauthenticated)?;

    gate.check(claims.role)?;

    Ok(next.run(req).await)
}
