//! Credential store seam.
//!
//! The identity service consumes the store through a trait so the serving
//! layer stays independent of the backing database.

pub mod memory;
pub mod postgres;

use crate::models::{Account, ApprovalState};
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::InMemoryAccountStore;
pub use postgres::PgAccountStore;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert_account(&self, account: &Account) -> Result<(), anyhow::Error>;

    async fn find_by_handle(&self, handle: &str) -> Result<Option<Account>, anyhow::Error>;

    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<Account>, anyhow::Error>;

    /// Returns false when no such account exists.
    async fn set_approval_state(
        &self,
        account_id: Uuid,
        state: ApprovalState,
    ) -> Result<bool, anyhow::Error>;

    /// Set the default tenant scope carried into issued tokens.
    async fn set_default_client(
        &self,
        account_id: Uuid,
        client_id: Uuid,
    ) -> Result<bool, anyhow::Error>;

    /// Delete an account; memberships cascade. Returns false when no such
    /// account exists.
    async fn delete_account(&self, account_id: Uuid) -> Result<bool, anyhow::Error>;

    async fn add_membership(
        &self,
        account_id: Uuid,
        client_id: Uuid,
    ) -> Result<(), anyhow::Error>;

    async fn is_member(&self, account_id: Uuid, client_id: Uuid)
        -> Result<bool, anyhow::Error>;
}
