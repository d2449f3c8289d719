use std::sync::Arc;

use service_core::auth::{IdentityClaims, TokenCodec};
use uuid::Uuid;

use crate::{
    dtos::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    models::{Account, ApprovalState},
    services::ServiceError,
    store::AccountStore,
    utils::{hash_secret, verify_secret, LoginSecret, SecretHash},
};

/// The identity authority: the only component that mints session tokens.
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn AccountStore>,
    codec: TokenCodec,
}

fn normalize_handle(handle: &str) -> String {
    handle.trim().to_lowercase()
}

impl IdentityService {
    pub fn new(store: Arc<dyn AccountStore>, codec: TokenCodec) -> Self {
        Self { store, codec }
    }

    /// Register a new account. Registration never authenticates: the account
    /// is created pending approval and no token is returned.
    pub async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, ServiceError> {
        let handle = normalize_handle(&req.login_handle);

        if self
            .store
            .find_by_handle(&handle)
            .await
            .map_err(ServiceError::Database)?
            .is_some()
        {
            return Err(ServiceError::DuplicateHandle(handle));
        }

        let secret_hash = hash_secret(&LoginSecret::new(req.secret))
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Secret hashing error: {}", e)))?;

        let account = Account::new(handle, secret_hash.into_string(), req.role);

        self.store
            .insert_account(&account)
            .await
            .map_err(ServiceError::Database)?;

        tracing::info!(account_id = %account.account_id, "Account registered");

        Ok(RegisterResponse {
            account_id: account.account_id,
            message: "Registration successful. The account awaits administrator approval."
                .to_string(),
        })
    }

    /// Authenticate and mint a session token.
    ///
    /// Unknown handle and wrong secret produce the identical rejection, so a
    /// caller cannot tell which field was wrong.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let handle = normalize_handle(&req.login_handle);

        let account = self
            .store
            .find_by_handle(&handle)
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::InvalidCredentials)?;

        verify_secret(
            &LoginSecret::new(req.secret),
            &SecretHash::new(account.secret_hash.clone()),
        )
        .map_err(|_| ServiceError::InvalidCredentials)?;

        // The approval gate applies even with a correct secret.
        if !account.is_approved() {
            return Err(ServiceError::PendingApproval);
        }

        let token = self
            .codec
            .issue(
                account.account_id,
                &account.handle,
                account.role,
                account.client_id,
            )
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;

        tracing::info!(account_id = %account.account_id, "Session token issued");

        Ok(LoginResponse {
            token,
            role: account.role,
            login_handle: account.handle,
            expires_in: self.codec.ttl_seconds(),
        })
    }

    /// Verify a session token on behalf of a remote service.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, ServiceError> {
        self.codec.parse(token).map_err(|_| ServiceError::InvalidToken)
    }

    /// Administrative: approve a pending account.
    pub async fn approve(&self, account_id: Uuid) -> Result<(), ServiceError> {
        let updated = self
            .store
            .set_approval_state(account_id, ApprovalState::Approved)
            .await
            .map_err(ServiceError::Database)?;

        if !updated {
            return Err(ServiceError::AccountNotFound);
        }

        tracing::info!(%account_id, "Account approved");
        Ok(())
    }

    /// Administrative: grant an account access to a client. The first grant
    /// also becomes the account's default tenant scope.
    pub async fn grant_membership(
        &self,
        account_id: Uuid,
        client_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.store
            .find_by_id(account_id)
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::AccountNotFound)?;

        self.store
            .add_membership(account_id, client_id)
            .await
            .map_err(ServiceError::Database)?;

        self.store
            .set_default_client(account_id, client_id)
            .await
            .map_err(ServiceError::Database)?;

        tracing::info!(%account_id, %client_id, "Client membership granted");
        Ok(())
    }

    /// Administrative: delete an account; memberships cascade.
    pub async fn remove(&self, account_id: Uuid) -> Result<(), ServiceError> {
        let deleted = self
            .store
            .delete_account(account_id)
            .await
            .map_err(ServiceError::Database)?;

        if !deleted {
            return Err(ServiceError::AccountNotFound);
        }

        tracing::info!(%account_id, "Account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryAccountStore;
    use secrecy::Secret;
    use service_core::auth::Role;

    fn service() -> IdentityService {
        let store = Arc::new(InMemoryAccountStore::new());
        let codec = TokenCodec::new(&Secret::new("unit-test-secret".to_string()), 8).unwrap();
        IdentityService::new(store, codec)
    }

    fn register_req(handle: &str) -> RegisterRequest {
        RegisterRequest {
            login_handle: handle.to_string(),
            secret: "secret123".to_string(),
            role: Role::Staff,
        }
    }

    #[tokio::test]
    async fn registration_is_pending_and_never_authenticates() {
        let svc = service();
        let res = svc.register(register_req("Alice")).await.unwrap();
        assert!(res.message.contains("approval"));

        // Correct secret, still no token before approval
        let err = svc
            .login(LoginRequest {
                login_handle: "alice".to_string(),
                secret: "secret123".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PendingApproval));
    }

    #[tokio::test]
    async fn duplicate_handle_is_rejected_case_insensitively() {
        let svc = service();
        svc.register(register_req("alice")).await.unwrap();

        let err = svc.register(register_req("ALICE")).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateHandle(_)));
    }

    #[tokio::test]
    async fn login_after_approval_issues_a_token_with_the_account_role() {
        let svc = service();
        let res = svc.register(register_req("alice")).await.unwrap();
        svc.approve(res.account_id).await.unwrap();

        let login = svc
            .login(LoginRequest {
                login_handle: "alice".to_string(),
                secret: "secret123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(login.role, Role::Staff);
        assert_eq!(login.login_handle, "alice");

        let claims = svc.verify(&login.token).unwrap();
        assert_eq!(claims.sub, res.account_id);
        assert_eq!(claims.role, Role::Staff);
    }

    #[tokio::test]
    async fn unknown_handle_and_wrong_secret_are_indistinguishable() {
        let svc = service();
        let res = svc.register(register_req("alice")).await.unwrap();
        svc.approve(res.account_id).await.unwrap();

        let unknown = svc
            .login(LoginRequest {
                login_handle: "nobody".to_string(),
                secret: "secret123".to_string(),
            })
            .await
            .unwrap_err();
        let wrong = svc
            .login(LoginRequest {
                login_handle: "alice".to_string(),
                secret: "wrong-secret".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn first_membership_grant_sets_default_scope() {
        let svc = service();
        let res = svc.register(register_req("alice")).await.unwrap();
        svc.approve(res.account_id).await.unwrap();

        let client = Uuid::new_v4();
        svc.grant_membership(res.account_id, client).await.unwrap();

        let login = svc
            .login(LoginRequest {
                login_handle: "alice".to_string(),
                secret: "secret123".to_string(),
            })
            .await
            .unwrap();

        let claims = svc.verify(&login.token).unwrap();
        assert_eq!(claims.client_id, Some(client));
    }

    #[tokio::test]
    async fn verify_rejects_garbage() {
        let svc = service();
        assert!(matches!(
            svc.verify("garbage").unwrap_err(),
            ServiceError::InvalidToken
        ));
    }

    #[tokio::test]
    async fn remove_unknown_account_is_not_found() {
        let svc = service();
        assert!(matches!(
            svc.remove(Uuid::new_v4()).await.unwrap_err(),
            ServiceError::AccountNotFound
        ));
    }
}
