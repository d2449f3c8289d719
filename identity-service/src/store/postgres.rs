//! PostgreSQL credential store.

use async_trait::async_trait;
use service_core::auth::TenantDirectory;
use service_core::error::AppError;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Account, ApprovalState};
use crate::store::AccountStore;

#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: PgRow) -> Result<Account, anyhow::Error> {
    let role: String = row.try_get("role")?;
    let approval_state: String = row.try_get("approval_state")?;

    Ok(Account {
        account_id: row.try_get("account_id")?,
        handle: row.try_get("handle")?,
        secret_hash: row.try_get("secret_hash")?,
        role: role.parse().map_err(anyhow::Error::msg)?,
        approval_state: approval_state.parse().map_err(anyhow::Error::msg)?,
        client_id: row.try_get("client_id")?,
        created_utc: row.try_get("created_utc")?,
    })
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert_account(&self, account: &Account) -> Result<(), anyhow::Error> {
        sqlx::query(
            "INSERT INTO accounts \
             (account_id, handle, secret_hash, role, approval_state, client_id, created_utc) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(account.account_id)
        .bind(&account.handle)
        .bind(&account.secret_hash)
        .bind(account.role.as_str())
        .bind(account.approval_state.as_str())
        .bind(account.client_id)
        .bind(account.created_utc)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<Account>, anyhow::Error> {
        let row = sqlx::query("SELECT * FROM accounts WHERE handle = $1")
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?;

        row.map(account_from_row).transpose()
    }

    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<Account>, anyhow::Error> {
        let row = sqlx::query("SELECT * FROM accounts WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(account_from_row).transpose()
    }

    async fn set_approval_state(
        &self,
        account_id: Uuid,
        state: ApprovalState,
    ) -> Result<bool, anyhow::Error> {
        let result = sqlx::query("UPDATE accounts SET approval_state = $1 WHERE account_id = $2")
            .bind(state.as_str())
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_default_client(
        &self,
        account_id: Uuid,
        client_id: Uuid,
    ) -> Result<bool, anyhow::Error> {
        let result = sqlx::query(
            "UPDATE accounts SET client_id = $1 WHERE account_id = $2 AND client_id IS NULL",
        )
        .bind(client_id)
        .bind(account_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_account(&self, account_id: Uuid) -> Result<bool, anyhow::Error> {
        // client_members rows cascade via the foreign key.
        let result = sqlx::query("DELETE FROM accounts WHERE account_id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_membership(
        &self,
        account_id: Uuid,
        client_id: Uuid,
    ) -> Result<(), anyhow::Error> {
        sqlx::query(
            "INSERT INTO client_members (account_id, client_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(account_id)
        .bind(client_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn is_member(
        &self,
        account_id: Uuid,
        client_id: Uuid,
    ) -> Result<bool, anyhow::Error> {
        let row =
            sqlx::query("SELECT 1 FROM client_members WHERE account_id = $1 AND client_id = $2")
                .bind(account_id)
                .bind(client_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.is_some())
    }
}

#[async_trait]
impl TenantDirectory for PgAccountStore {
    async fn is_member(&self, account_id: Uuid, client_id: Uuid) -> Result<bool, AppError> {
        AccountStore::is_member(self, account_id, client_id)
            .await
            .map_err(AppError::DatabaseError)
    }
}
