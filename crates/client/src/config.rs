//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ORBITCART_API_URL` - Backend API base URL (fallback: `NEXT_PUBLIC_API_URL`,
//!   the variable the deployed web frontend is configured with)
//!
//! ## Optional
//! - `ORBITCART_TIMEOUT_SECS` - Request timeout in seconds (default: 30)

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Orbitcart client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend API base URL.
    pub api_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but the base URL.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL variable is missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let raw_url = get_api_url("ORBITCART_API_URL")?;
        let api_url = raw_url
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("ORBITCART_API_URL".to_string(), e.to_string()))?;

        let timeout_secs = get_env_or_default("ORBITCART_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ORBITCART_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            user_agent: default_user_agent(),
        })
    }
}

fn default_user_agent() -> String {
    format!("orbitcart-client/{}", env!("CARGO_PKG_VERSION"))
}

/// Get the API base URL with fallback to `NEXT_PUBLIC_API_URL` (set for the
/// web frontend; supported here so both clients can share one environment).
fn get_api_url(primary_key: &str) -> Result<String, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(value);
    }
    if let Ok(value) = std::env::var("NEXT_PUBLIC_API_URL") {
        return Ok(value);
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
