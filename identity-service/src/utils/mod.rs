pub mod password;
pub mod validation;

pub use password::{hash_secret, verify_secret, LoginSecret, SecretHash};
pub use validation::ValidatedJson;
