use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Newtype for a login secret to prevent accidental logging
#[derive(Clone)]
pub struct LoginSecret(String);

impl LoginSecret {
    pub fn new(secret: String) -> Self {
        Self(secret)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for LoginSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LoginSecret(..)")
    }
}

/// Newtype for a stored secret hash
#[derive(Debug, Clone)]
pub struct SecretHash(String);

impl SecretHash {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Hash a login secret using Argon2id with a random salt.
pub fn hash_secret(secret: &LoginSecret) -> Result<SecretHash, anyhow::Error> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2
        .hash_password(secret.as_str().as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash secret: {}", e))?
        .to_string();

    Ok(SecretHash::new(hash))
}

/// Verify a login secret against a stored hash.
///
/// Returns Ok(()) on a match. The caller must collapse a mismatch and an
/// unknown handle into the same response.
pub fn verify_secret(secret: &LoginSecret, hash: &SecretHash) -> Result<(), anyhow::Error> {
    let parsed_hash = PasswordHash::new(hash.as_str())
        .map_err(|e| anyhow::anyhow!("Invalid secret hash format: {}", e))?;

    Argon2::default()
        .verify_password(secret.as_str().as_bytes(), &parsed_hash)
        .map_err(|_| anyhow::anyhow!("Secret verification failed"))
}
