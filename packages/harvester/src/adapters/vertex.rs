//! Vertex AI embeddings and Google service-account credentials.

use async_trait::async_trait;
use vertex_client::{ServiceAccountAuth, VertexClient, VertexError};

use crate::error::{CredentialError, CredentialResult, EmbeddingError, EmbeddingResult};
use crate::security::AccessToken;
use crate::traits::{credentials::CredentialProvider, embedder::EmbeddingClient};

#[async_trait]
impl CredentialProvider for ServiceAccountAuth {
    async fn refresh(&self) -> CredentialResult<AccessToken> {
        let token = self.fetch_token().await.map_err(credential_error)?;
        Ok(AccessToken::new(token.access_token, token.expires_at))
    }
}

#[async_trait]
impl EmbeddingClient for VertexClient {
    async fn predict(&self, access_token: &str, text: &str) -> EmbeddingResult<Vec<f32>> {
        VertexClient::predict(self, access_token, text)
            .await
            .map_err(embedding_error)
    }
}

fn credential_error(e: VertexError) -> CredentialError {
    match e {
        VertexError::Config(msg) => CredentialError::Missing(msg),
        VertexError::InvalidKey(msg) => CredentialError::InvalidKey(msg),
        other => CredentialError::Exchange(Box::new(other)),
    }
}

fn embedding_error(e: VertexError) -> EmbeddingError {
    match e {
        VertexError::Parse(msg) => EmbeddingError::Malformed(msg),
        other => EmbeddingError::Provider(Box::new(other)),
    }
}
