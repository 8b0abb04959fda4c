//! Pure Vertex AI embedding client.
//!
//! A minimal client for the Vertex AI text-embedding `predict` endpoint, plus
//! the service-account token exchange needed to call it.
//!
//! # Example
//!
//! ```rust,ignore
//! use vertex_client::{ServiceAccountAuth, ServiceAccountKey, VertexClient};
//!
//! let auth = ServiceAccountAuth::new(ServiceAccountKey::from_file("key.json")?);
//! let token = auth.fetch_token().await?;
//!
//! let client = VertexClient::new("my-project", "us-central1", "gemini-embedding-001");
//! let embedding = client.predict(&token.access_token, "Introduction to algorithms").await?;
//! ```

pub mod auth;
pub mod error;
pub mod types;

pub use auth::{GoogleToken, ServiceAccountAuth, ServiceAccountKey};
pub use error::{Result, VertexError};
pub use types::{PredictRequest, PredictResponse};

use reqwest::Client;
use tracing::{debug, warn};

pub const DEFAULT_LOCATION: &str = "us-central1";
pub const DEFAULT_MODEL: &str = "gemini-embedding-001";

/// Vertex AI embedding client for one project, region and model.
#[derive(Clone, Debug)]
pub struct VertexClient {
    http_client: Client,
    project_id: String,
    location: String,
    model: String,
    base_url: Option<String>,
}

impl VertexClient {
    pub fn new(
        project_id: impl Into<String>,
        location: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http_client: Client::new(),
            project_id: project_id.into(),
            location: location.into(),
            model: model.into(),
            base_url: None,
        }
    }

    /// Point at a different host (regional proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full URL of the model's predict endpoint.
    pub fn endpoint(&self) -> String {
        let base = self
            .base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}-aiplatform.googleapis.com", self.location));
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:predict",
            base.trim_end_matches('/'),
            self.project_id,
            self.location,
            self.model
        )
    }

    /// Embed a single text.
    pub async fn predict(&self, access_token: &str, text: &str) -> Result<Vec<f32>> {
        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(access_token)
            .json(&PredictRequest::single(text))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Embedding request failed");
                VertexError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), error = %message, "Vertex embedding error");
            return Err(VertexError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| VertexError::Parse(format!("Invalid predict response: {}", e)))?;

        let values = first_embedding(body)?;
        debug!(model = %self.model, dimensions = values.len(), "Embedding created");
        Ok(values)
    }
}

fn first_embedding(body: PredictResponse) -> Result<Vec<f32>> {
    body.predictions
        .into_iter()
        .next()
        .map(|p| p.embeddings.values)
        .ok_or_else(|| VertexError::Parse("No predictions in response".into()))
}
