use std::time::Duration;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::api::headers::VERSION;
use crate::auth::{SigningKey, TOKEN_TTL};
use crate::cli::Args;

/// Below this many bytes a configured signing key is accepted with a warning
const MIN_RECOMMENDED_KEY_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub security: SecurityConfig,
    pub api: ApiConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub signing_key: SigningKey,
    pub token_ttl: Duration,
    /// Only consulted in production; development allows any origin
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub version: String,
    pub expose_error_stack: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT signing key was not provided")]
    MissingSigningKey,

    #[error("allowed origin is not a valid header value: {0}")]
    InvalidOrigin(String),

    #[error("server version is not a valid header value: {0}")]
    InvalidVersion(String),
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let environment = if args.debug {
            Environment::Development
        } else {
            Environment::Production
        };

        let configured = args
            .jwt_signing_key
            .as_deref()
            .and_then(SigningKey::from_secret);

        let signing_key = match (configured, environment) {
            (Some(key), _) => {
                if key.len() < MIN_RECOMMENDED_KEY_LEN {
                    tracing::warn!(
                        "JWT signing key is shorter than {} bytes",
                        MIN_RECOMMENDED_KEY_LEN
                    );
                }
                key
            }
            (None, Environment::Development) => {
                tracing::warn!("JWT signing key is empty. Generating random key.");
                SigningKey::generate()
            }
            (None, Environment::Production) => return Err(ConfigError::MissingSigningKey),
        };

        let cors_origins = args
            .allowed_origins
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let config = Self {
            environment,
            security: SecurityConfig {
                signing_key,
                token_ttl: TOKEN_TTL,
                cors_origins,
            },
            api: ApiConfig {
                version: VERSION.to_string(),
                expose_error_stack: !args.hide_error_stack,
            },
            server: ServerConfig {
                port: args.port,
                database_url: args.database_url.clone(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Development posture with the given key
    pub fn development(signing_key: SigningKey) -> Self {
        Self {
            environment: Environment::Development,
            security: SecurityConfig {
                signing_key,
                token_ttl: TOKEN_TTL,
                cors_origins: Vec::new(),
            },
            api: ApiConfig {
                version: VERSION.to_string(),
                expose_error_stack: true,
            },
            server: ServerConfig {
                port: 8080,
                database_url: None,
            },
        }
    }

    /// Production posture with the given key and allowed origins
    pub fn production(signing_key: SigningKey, cors_origins: Vec<String>) -> Self {
        let mut config = Self::development(signing_key);
        config.environment = Environment::Production;
        config.security.cors_origins = cors_origins;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Checks every value that later becomes a header
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.version_header()?;
        self.origin_headers()?;
        Ok(())
    }

    pub fn version_header(&self) -> Result<HeaderValue, ConfigError> {
        HeaderValue::from_str(&self.api.version)
            .map_err(|_| ConfigError::InvalidVersion(self.api.version.clone()))
    }

    pub fn origin_headers(&self) -> Result<Vec<HeaderValue>, ConfigError> {
        self.security
            .cors_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidOrigin(origin.clone()))
            })
            .collect()
    }
}
