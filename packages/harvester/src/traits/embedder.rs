//! Embedding provider abstraction.

use async_trait::async_trait;

use crate::error::EmbeddingResult;

/// Turns text into a vector over an authenticated call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed `text`, authenticating with `access_token`.
    async fn predict(&self, access_token: &str, text: &str) -> EmbeddingResult<Vec<f32>>;
}
