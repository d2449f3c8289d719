use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use service_core::auth::TenantDirectory;
use service_core::error::AppError;
use uuid::Uuid;

/// Tenant membership table held in memory.
///
/// An empty directory means only the token's own client scope is admitted;
/// cross-tenant access requires an explicit grant.
#[derive(Default)]
pub struct InMemoryTenantDirectory {
    memberships: Mutex<HashSet<(Uuid, Uuid)>>,
}

impl InMemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, account_id: Uuid, client_id: Uuid) {
        let mut memberships = self.memberships.lock().unwrap();
        memberships.insert((account_id, client_id));
    }
}

#[async_trait]
impl TenantDirectory for InMemoryTenantDirectory {
    async fn is_member(&self, account_id: Uuid, client_id: Uuid) -> Result<bool, AppError> {
        let memberships = self.memberships.lock().unwrap();
        Ok(memberships.contains(&(account_id, client_id)))
    }
}
