//! Pure Pinecone REST API client.
//!
//! Resolves an index's data-plane host through the control plane and upserts
//! vectors into it.
//!
//! # Example
//!
//! ```rust,ignore
//! use pinecone_client::{PineconeClient, Vector};
//!
//! let client = PineconeClient::new(api_key).connect("brown-courses").await?;
//! client.upsert(&[Vector { id: "CSCI 0150".into(), values, metadata }]).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{PineconeError, Result};
pub use types::{IndexDescription, UpsertResponse, Vector};

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use types::UpsertRequest;

const CONTROL_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2024-07";

#[derive(Clone)]
pub struct PineconeClient {
    client: reqwest::Client,
    api_key: String,
    control_url: String,
    host: Option<String>,
    namespace: Option<String>,
}

impl std::fmt::Debug for PineconeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeClient")
            .field("api_key", &"[REDACTED]")
            .field("host", &self.host)
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl PineconeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            control_url: CONTROL_URL.to_string(),
            host: None,
            namespace: None,
        }
    }

    /// Use a known data-plane host instead of resolving it.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(normalize_host(&host.into()));
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = (!namespace.is_empty()).then_some(namespace);
        self
    }

    pub fn with_control_url(mut self, url: impl Into<String>) -> Self {
        self.control_url = url.into();
        self
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Fetch an index's description from the control plane.
    pub async fn describe_index(&self, name: &str) -> Result<IndexDescription> {
        let url = format!("{}/indexes/{}", self.control_url, name);
        self.send(self.client.get(&url)).await
    }

    /// Resolve the data-plane host for `index` unless one is already set.
    pub async fn connect(mut self, index: &str) -> Result<Self> {
        if self.host.is_none() {
            let description = self.describe_index(index).await?;
            tracing::info!(index = %description.name, host = %description.host, "Resolved index host");
            self.host = Some(normalize_host(&description.host));
        }
        Ok(self)
    }

    /// Insert or overwrite vectors by id.
    pub async fn upsert(&self, vectors: &[Vector]) -> Result<UpsertResponse> {
        let host = self
            .host
            .as_deref()
            .ok_or_else(|| PineconeError::Config("index host not resolved".into()))?;

        let body = UpsertRequest {
            vectors,
            namespace: self.namespace.as_deref(),
        };
        let response: UpsertResponse = self
            .send(self.client.post(format!("{}/vectors/upsert", host)).json(&body))
            .await?;

        tracing::debug!(count = response.upserted_count, "Upserted vectors");
        Ok(response)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let resp = request
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PineconeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json().await?)
    }
}

/// Hosts come back from the control plane without a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn test_normalize_host() {
        assert_eq!(
            normalize_host("brown-courses-abc.svc.pinecone.io"),
            "https://brown-courses-abc.svc.pinecone.io"
        );
        assert_eq!(normalize_host("http://localhost:5081/"), "http://localhost:5081");
    }

    #[test]
    fn test_upsert_body_shape() {
        let mut metadata = Map::new();
        metadata.insert("department".into(), json!("CSCI"));
        let vectors = [Vector {
            id: "CSCI 0150".into(),
            values: vec![0.5, 0.25],
            metadata,
        }];

        let body = serde_json::to_value(UpsertRequest {
            vectors: &vectors,
            namespace: None,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "vectors": [{
                    "id": "CSCI 0150",
                    "values": [0.5, 0.25],
                    "metadata": { "department": "CSCI" }
                }]
            })
        );

        let body = serde_json::to_value(UpsertRequest {
            vectors: &vectors,
            namespace: Some("fall"),
        })
        .unwrap();
        assert_eq!(body["namespace"], "fall");
    }

    #[test]
    fn test_empty_namespace_is_default() {
        let client = PineconeClient::new("key").with_namespace("");
        assert!(client.namespace.is_none());
    }

    #[test]
    fn test_rejection_classification() {
        let bad_request = PineconeError::Api {
            status: 400,
            message: "dimension mismatch".into(),
        };
        let unavailable = PineconeError::Api {
            status: 503,
            message: "down".into(),
        };
        assert!(bad_request.is_rejection());
        assert!(!unavailable.is_rejection());
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = PineconeClient::new("pc-secret");
        assert!(!format!("{:?}", client).contains("pc-secret"));
    }

    #[test]
    fn test_index_description_parses() {
        let description: IndexDescription = serde_json::from_str(
            r#"{"name":"brown-courses","host":"brown-courses-x.svc.pinecone.io","dimension":3072,"metric":"cosine","status":{"ready":true}}"#,
        )
        .unwrap();
        assert_eq!(description.host, "brown-courses-x.svc.pinecone.io");
        assert_eq!(description.dimension, Some(3072));
    }
}
