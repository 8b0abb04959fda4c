use thiserror::Error;

pub type Result<T> = std::result::Result<T, PineconeError>;

#[derive(Debug, Error)]
pub enum PineconeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl PineconeError {
    /// Whether the index refused the request itself (4xx), as opposed to a
    /// transport or server failure.
    pub fn is_rejection(&self) -> bool {
        matches!(self, PineconeError::Api { status, .. } if (400..500).contains(status))
    }
}
