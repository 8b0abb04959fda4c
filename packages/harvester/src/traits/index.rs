//! Vector index abstraction.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::UpsertResult;

/// A metadata value. There is no null variant: the target stores reject
/// null-valued fields, so absent values are simply left out of the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    Integer(u32),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<u32> for MetadataValue {
    fn from(value: u32) -> Self {
        MetadataValue::Integer(value)
    }
}

/// Metadata attached to a stored vector.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Write side of a vector index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite the vector stored under `id`.
    async fn upsert(&self, id: &str, vector: &[f32], metadata: &Metadata) -> UpsertResult<()>;

    /// Get the index name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
