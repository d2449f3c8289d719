use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};
use uuid::Uuid;

use crate::auth::claims::{IdentityClaims, Role};
use crate::error::AppError;

/// Default session lifetime.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 8;

/// Signed session-token codec.
///
/// HS256 over a shared secret injected at construction. Tokens are
/// self-contained and never persisted; the only revocation is expiry.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    /// Create a codec from the shared signing secret.
    ///
    /// A missing secret is a fatal configuration error, not something to
    /// surface to request callers.
    pub fn new(secret: &Secret<String>, ttl_hours: i64) -> Result<Self, AppError> {
        let secret = secret.expose_secret();
        if secret.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Token signing secret must not be empty"
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        })
    }

    /// Issue a session token for an identity.
    pub fn issue(
        &self,
        subject: Uuid,
        handle: &str,
        role: Role,
        client_id: Option<Uuid>,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = IdentityClaims {
            sub: subject,
            handle: handle.to_string(),
            role,
            client_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode token: {}", e)))
    }

    /// Verify signature and expiry, returning the embedded claims.
    ///
    /// Binary outcome: any signature mismatch, malformed structure, or past
    /// expiry is the same rejection.
    pub fn parse(&self, token: &str) -> Result<IdentityClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<IdentityClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidOrExpiredToken("Invalid or expired token".to_string()))
    }

    /// Session lifetime in seconds, for client info.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }
}
