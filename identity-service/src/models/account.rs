//! Credential record: the long-lived identity row behind every login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use service_core::auth::Role;
use uuid::Uuid;

/// Approval state of an account.
///
/// Gates login only: a pending account exists but cannot obtain a session
/// token. Mutated to `Approved` by an administrative action, never by the
/// subject itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalState {
    Pending,
    Approved,
}

impl ApprovalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalState::Pending => "pending",
            ApprovalState::Approved => "approved",
        }
    }
}

impl std::str::FromStr for ApprovalState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalState::Pending),
            "approved" => Ok(ApprovalState::Approved),
            other => Err(format!("Unknown approval state: {}", other)),
        }
    }
}

/// Credential record.
#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: Uuid,
    /// Normalized login handle, unique across the store.
    pub handle: String,
    pub secret_hash: String,
    pub role: Role,
    pub approval_state: ApprovalState,
    /// Default tenant scope carried into issued tokens. Set when the first
    /// client membership is granted.
    pub client_id: Option<Uuid>,
    pub created_utc: DateTime<Utc>,
}

impl Account {
    /// Create a new account in the pending state.
    pub fn new(handle: String, secret_hash: String, role: Role) -> Self {
        Self {
            account_id: Uuid::new_v4(),
            handle,
            secret_hash,
            role,
            approval_state: ApprovalState::Pending,
            client_id: None,
            created_utc: Utc::now(),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.approval_state == ApprovalState::Approved
    }
}
