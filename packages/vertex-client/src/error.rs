//! Error types for the Vertex AI client.

use thiserror::Error;

/// Result type for Vertex AI client operations.
pub type Result<T> = std::result::Result<T, VertexError>;

/// Vertex AI client errors.
#[derive(Debug, Error)]
pub enum VertexError {
    /// Configuration error (missing project, unreadable key file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Service-account key could not be used for signing
    #[error("Invalid service account key: {0}")]
    InvalidKey(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}
