//! Shared identity layer: token codec, verification adapter, and the
//! role/tenant gates every protected service composes into its router.
//!
//! The gate chain for a protected request is
//! `require_auth` -> `require_role` (optional) -> `require_client_match`
//! (optional) -> handler. Any failed step terminates the request.

pub mod claims;
pub mod role;
pub mod tenant;
pub mod token;
pub mod verifier;

pub use claims::{AuthUser, IdentityClaims, Role};
pub use role::{require_role, RoleGate};
pub use tenant::{require_client_match, TenantDirectory, TenantGate};
pub use token::TokenCodec;
pub use verifier::{require_auth, TokenVerifier, VerifyResponse};
