use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(anyhow::Error),

    #[error("Internal server error: {0}")]
    Internal(anyhow::Error),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Handle already registered: {0}")]
    DuplicateHandle(String),

    #[error("Account is pending administrator approval")]
    PendingApproval,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Account not found")]
    AccountNotFound,
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => AppError::DatabaseError(e),
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::InvalidCredentials => AppError::InvalidCredentials,
            ServiceError::DuplicateHandle(h) => AppError::DuplicateIdentifier(h),
            ServiceError::PendingApproval => {
                AppError::AccountPendingApproval(
                    "Account is pending administrator approval".to_string(),
                )
            }
            ServiceError::InvalidToken => {
                AppError::InvalidOrExpiredToken("Invalid or expired token".to_string())
            }
            ServiceError::AccountNotFound => {
                AppError::NotFound(anyhow::anyhow!("Account not found"))
            }
        }
    }
}
