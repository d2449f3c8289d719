//! In-memory credential store, used by tests and local development.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use service_core::auth::TenantDirectory;
use service_core::error::AppError;
use uuid::Uuid;

use crate::models::{Account, ApprovalState};
use crate::store::AccountStore;

#[derive(Default)]
struct Inner {
    accounts: HashMap<Uuid, Account>,
    memberships: HashSet<(Uuid, Uuid)>,
}

#[derive(Default)]
pub struct InMemoryAccountStore {
    inner: Mutex<Inner>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert_account(&self, account: &Account) -> Result<(), anyhow::Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.accounts.insert(account.account_id, account.clone());
        Ok(())
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<Account>, anyhow::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .accounts
            .values()
            .find(|a| a.handle == handle)
            .cloned())
    }

    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<Account>, anyhow::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.accounts.get(&account_id).cloned())
    }

    async fn set_approval_state(
        &self,
        account_id: Uuid,
        state: ApprovalState,
    ) -> Result<bool, anyhow::Error> {
        let mut inner = self.inner.lock().unwrap();
        match inner.accounts.get_mut(&account_id) {
            Some(account) => {
                account.approval_state = state;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_default_client(
        &self,
        account_id: Uuid,
        client_id: Uuid,
    ) -> Result<bool, anyhow::Error> {
        let mut inner = self.inner.lock().unwrap();
        match inner.accounts.get_mut(&account_id) {
            Some(account) if account.client_id.is_none() => {
                account.client_id = Some(client_id);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }

    async fn delete_account(&self, account_id: Uuid) -> Result<bool, anyhow::Error> {
        let mut inner = self.inner.lock().unwrap();
        let existed = inner.accounts.remove(&account_id).is_some();
        inner.memberships.retain(|(a, _)| *a != account_id);
        Ok(existed)
    }

    async fn add_membership(
        &self,
        account_id: Uuid,
        client_id: Uuid,
    ) -> Result<(), anyhow::Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.memberships.insert((account_id, client_id));
        Ok(())
    }

    async fn is_member(
        &self,
        account_id: Uuid,
        client_id: Uuid,
    ) -> Result<bool, anyhow::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.memberships.contains(&(account_id, client_id)))
    }
}

#[async_trait]
impl TenantDirectory for InMemoryAccountStore {
    async fn is_member(&self, account_id: Uuid, client_id: Uuid) -> Result<bool, AppError> {
        AccountStore::is_member(self, account_id, client_id)
            .await
            .map_err(AppError::DatabaseError)
    }
}
