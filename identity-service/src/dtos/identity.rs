use serde::{Deserialize, Serialize};
use service_core::auth::Role;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64))]
    pub login_handle: String,
    #[validate(length(min = 8, max = 128))]
    pub secret: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub account_id: Uuid,
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64))]
    pub login_handle: String,
    #[validate(length(min = 1, max = 128))]
    pub secret: String,
}

/// Successful login: the session token plus role and handle for client
/// convenience.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub login_handle: String,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}
