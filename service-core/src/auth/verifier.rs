use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};

use crate::auth::claims::IdentityClaims;
use crate::auth::token::TokenCodec;
use crate::error::AppError;

/// Default deadline for a remote verification call.
pub const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 8;

/// Body shape of the identity service's `/identity/verify` endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub claims: IdentityClaims,
}

#[derive(Serialize)]
struct VerifyRequestBody<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct UpstreamErrorBody {
    message: String,
}

/// Token verification adapter.
///
/// Every protected service authenticates inbound requests through one of two
/// interchangeable strategies, selected by deployment topology:
///
/// - `Local`: the service holds the shared signing secret and checks the
///   token in-process. No network hop.
/// - `Remote`: the service holds no secret and delegates to the identity
///   service over HTTP with a bounded deadline.
///
/// Both yield the same [`IdentityClaims`] shape for downstream gates.
#[derive(Clone)]
pub enum TokenVerifier {
    Local(TokenCodec),
    Remote(RemoteVerifier),
}

#[derive(Clone)]
pub struct RemoteVerifier {
    client: reqwest::Client,
    verify_url: String,
}

impl TokenVerifier {
    pub fn local(codec: TokenCodec) -> Self {
        TokenVerifier::Local(codec)
    }

    /// Build a remote verifier against the identity service's base URL.
    pub fn remote(authority_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e))
            })?;

        Ok(TokenVerifier::Remote(RemoteVerifier {
            client,
            verify_url: format!("{}/identity/verify", authority_url.trim_end_matches('/')),
        }))
    }

    /// Verify a bearer token, producing the identity claims or a terminal
    /// rejection.
    ///
    /// Remote mode distinguishes three outcomes: a valid claim, an explicit
    /// rejection by the authority (propagated verbatim as the client error it
    /// is), and a failed call (`UpstreamUnavailable`). A caller must always
    /// be able to tell "your token is bad" apart from "the trust authority
    /// is down".
    pub async fn verify(&self, token: &str) -> Result<IdentityClaims, AppError> {
        match self {
            TokenVerifier::Local(codec) => codec.parse(token),
            TokenVerifier::Remote(remote) => remote.verify(token).await,
        }
    }
}

impl RemoteVerifier {
    async fn verify(&self, token: &str) -> Result<IdentityClaims, AppError> {
        let response = self
            .client
            .post(&self.verify_url)
            .json(&VerifyRequestBody { token })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %self.verify_url, error = %e, "Verify call failed");
                if e.is_timeout() {
                    AppError::UpstreamUnavailable("verification request timed out".to_string())
                } else {
                    AppError::UpstreamUnavailable("connection to identity service failed".to_string())
                }
            })?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let body: VerifyResponse = response.json().await.map_err(|e| {
                    AppError::UpstreamUnavailable(format!(
                        "malformed response from identity service: {}",
                        e
                    ))
                })?;
                Ok(body.claims)
            }
            // The authority's own rejection is a client error; pass its
            // status and message through unchanged.
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let message = response
                    .json::<UpstreamErrorBody>()
                    .await
                    .map(|b| b.message)
                    .unwrap_or_else(|_| "Invalid or expired token".to_string());

                if status == StatusCode::FORBIDDEN {
                    Err(AppError::AccountPendingApproval(message))
                } else {
                    Err(AppError::InvalidOrExpiredToken(message))
                }
            }
            other => Err(AppError::UpstreamUnavailable(format!(
                "identity service returned {}",
                other
            ))),
        }
    }
}

/// Extract the bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Middleware to require authentication.
///
/// Runs first in the gate chain: a missing header short-circuits before any
/// crypto or network work. On success the claims are attached to request
/// extensions for the downstream gates and handlers.
pub async fn require_auth(
    State(verifier): State<Arc<TokenVerifier>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .ok_or(AppError::MissingToken)?
        .to_string();

    let claims = verifier.verify(&token).await?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
