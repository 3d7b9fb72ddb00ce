//! Error taxonomy for API operations.
//!
//! Three broad classes cross the wire boundary: auth errors (missing or
//! invalid token), network errors (request failed outright), and server
//! errors (non-2xx with a message body). Cart and event call sites catch and
//! log rather than surface these; refresh failure is the one case the caller
//! must see, because it forces a logout.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur when calling the Orbitcart API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-2xx response with a message body.
    #[error("API error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message body, or raw response text when the body is not JSON.
        message: String,
    },

    /// Not authenticated, or the session could not be refreshed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request body could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Request path produced an invalid URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let err = ApiError::Server {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "API error (503): maintenance");
    }

    #[test]
    fn test_unauthorized_display() {
        let err = ApiError::Unauthorized("session expired".to_string());
        assert_eq!(err.to_string(), "Unauthorized: session expired");
    }
}
