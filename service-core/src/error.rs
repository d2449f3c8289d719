use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Error taxonomy shared by every service in the workspace.
///
/// Each variant is terminal for the current request and maps to exactly one
/// HTTP status. `UpstreamUnavailable` must stay distinguishable from the
/// token-rejection variants end-to-end: "the trust authority is down" is a
/// 502, never a 401.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing or invalid Authorization header")]
    MissingToken,

    #[error("{0}")]
    InvalidOrExpiredToken(String),

    #[error("{0}")]
    AccountPendingApproval(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Insufficient role for this operation")]
    InsufficientRole,

    #[error("Client mismatch: {0}")]
    TenantMismatch(String),

    #[error("{0} is already registered")]
    DuplicateIdentifier(String),

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("Identity authority unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Identity claims missing from request context")]
    Unauthenticated,

    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// Uniform error body: `{message}` plus a machine-readable `code` where a
/// caller needs to branch without parsing prose (upstream failures).
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingToken
            | AppError::InvalidOrExpiredToken(_)
            | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::AccountPendingApproval(_)
            | AppError::InsufficientRole
            | AppError::TenantMismatch(_) => StatusCode::FORBIDDEN,
            AppError::DuplicateIdentifier(_) => StatusCode::CONFLICT,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthenticated
            | AppError::DatabaseError(_)
            | AppError::InternalError(_)
            | AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> Option<&'static str> {
        match self {
            AppError::UpstreamUnavailable(_) => Some("upstream_unavailable"),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Do not leak internals to the caller; details go to the log.
            AppError::DatabaseError(err) | AppError::InternalError(err) => {
                tracing::error!(error = %err, "Internal error");
                "Internal server error".to_string()
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = %err, "Configuration error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            message,
            code: self.code().map(str::to_string),
        };

        (status, Json(body)).into_response()
    }
}
