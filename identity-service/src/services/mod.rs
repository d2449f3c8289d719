pub mod error;
pub mod identity;

pub use error::ServiceError;
pub use identity::IdentityService;
