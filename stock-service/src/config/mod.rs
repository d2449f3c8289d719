use std::env;
use std::time::Duration;

use secrecy::Secret;
use service_core::auth::{TokenCodec, TokenVerifier};
use service_core::config as core_config;
use service_core::config::get_env;
use service_core::error::AppError;

#[derive(Debug, Clone)]
pub struct StockConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub verifier: VerifierConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

/// How this service authenticates inbound tokens.
///
/// `Local` deployments hold the shared signing secret and verify in-process;
/// `Remote` deployments hold no secret and delegate each verification to the
/// identity service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerifierMode {
    Local,
    Remote,
}

#[derive(Debug, Clone)]
pub struct VerifierConfig {
    pub mode: VerifierMode,
    /// Required in local mode.
    pub token_secret: Option<Secret<String>>,
    /// Base URL of the identity service; required in remote mode.
    pub authority_url: Option<String>,
    pub verify_timeout_seconds: u64,
}

impl StockConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let mode: VerifierMode = get_env("VERIFIER_MODE", Some("local"), is_prod)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let token_secret = match mode {
            VerifierMode::Local => Some(Secret::new(get_env("TOKEN_SIGNING_SECRET", None, true)?)),
            VerifierMode::Remote => None,
        };
        let authority_url = match mode {
            VerifierMode::Local => None,
            VerifierMode::Remote => Some(get_env("IDENTITY_SERVICE_URL", None, true)?),
        };

        let config = StockConfig {
            common,
            environment,
            service_name: get_env("SERVICE_NAME", Some("stock-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            verifier: VerifierConfig {
                mode,
                token_secret,
                authority_url,
                verify_timeout_seconds: get_env("VERIFY_TIMEOUT_SECONDS", Some("8"), is_prod)?
                    .parse()
                    .unwrap_or(8),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.verifier.verify_timeout_seconds == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "VERIFY_TIMEOUT_SECONDS must be greater than 0"
            )));
        }

        Ok(())
    }
}

impl VerifierConfig {
    /// Construct the verification adapter this deployment was configured for.
    pub fn build(&self) -> Result<TokenVerifier, AppError> {
        match self.mode {
            VerifierMode::Local => {
                let secret = self.token_secret.as_ref().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "TOKEN_SIGNING_SECRET is required in local verifier mode"
                    ))
                })?;
                let codec =
                    TokenCodec::new(secret, service_core::auth::token::DEFAULT_TOKEN_TTL_HOURS)?;
                Ok(TokenVerifier::local(codec))
            }
            VerifierMode::Remote => {
                let url = self.authority_url.as_ref().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "IDENTITY_SERVICE_URL is required in remote verifier mode"
                    ))
                })?;
                TokenVerifier::remote(url, Duration::from_secs(self.verify_timeout_seconds))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

impl std::str::FromStr for VerifierMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(VerifierMode::Local),
            "remote" => Ok(VerifierMode::Remote),
            _ => Err(format!("Invalid verifier mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_mode_parsing() {
        assert_eq!("local".parse::<VerifierMode>().unwrap(), VerifierMode::Local);
        assert_eq!("Remote".parse::<VerifierMode>().unwrap(), VerifierMode::Remote);
        assert!("proxy".parse::<VerifierMode>().is_err());
    }

    #[test]
    fn local_mode_requires_a_secret() {
        let config = VerifierConfig {
            mode: VerifierMode::Local,
            token_secret: None,
            authority_url: None,
            verify_timeout_seconds: 8,
        };
        assert!(matches!(config.build(), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn remote_mode_requires_an_authority_url() {
        let config = VerifierConfig {
            mode: VerifierMode::Remote,
            token_secret: None,
            authority_url: None,
            verify_timeout_seconds: 8,
        };
        assert!(matches!(config.build(), Err(AppError::ConfigError(_))));
    }
}
