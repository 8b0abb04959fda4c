use serde::{Deserialize, Serialize};

/// Body of a text-embedding predict call.
#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest {
    pub instances: Vec<Instance>,
}

impl PredictRequest {
    pub fn single(content: impl Into<String>) -> Self {
        Self {
            instances: vec![Instance {
                content: content.into(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Instance {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub embeddings: Embeddings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Embeddings {
    pub values: Vec<f32>,
    #[serde(default)]
    pub statistics: Option<EmbeddingStatistics>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingStatistics {
    #[serde(default)]
    pub token_count: Option<f64>,
    #[serde(default)]
    pub truncated: Option<bool>,
}
