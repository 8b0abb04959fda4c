//! Pinecone as the vector index.

use async_trait::async_trait;
use pinecone_client::{PineconeClient, PineconeError, Vector};
use serde_json::{Map, Value};

use crate::error::{UpsertError, UpsertResult};
use crate::traits::index::{Metadata, VectorIndex};

#[async_trait]
impl VectorIndex for PineconeClient {
    async fn upsert(&self, id: &str, vector: &[f32], metadata: &Metadata) -> UpsertResult<()> {
        let vector = Vector {
            id: id.to_string(),
            values: vector.to_vec(),
            metadata: metadata_map(metadata)?,
        };

        let response = PineconeClient::upsert(self, std::slice::from_ref(&vector))
            .await
            .map_err(|e| upsert_error(id, e))?;

        if response.upserted_count == 0 {
            return Err(UpsertError::Rejected {
                id: id.to_string(),
                reason: "index reported zero upserted vectors".into(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}

fn metadata_map(metadata: &Metadata) -> UpsertResult<Map<String, Value>> {
    match serde_json::to_value(metadata) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(UpsertError::Index(
            format!("metadata serialized to {} instead of an object", other).into(),
        )),
        Err(e) => Err(UpsertError::Index(Box::new(e))),
    }
}

fn upsert_error(id: &str, e: PineconeError) -> UpsertError {
    if e.is_rejection() {
        UpsertError::Rejected {
            id: id.to_string(),
            reason: e.to_string(),
        }
    } else {
        UpsertError::Index(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::index::MetadataValue;

    #[test]
    fn test_metadata_map_is_flat() {
        let mut metadata = Metadata::new();
        metadata.insert("department".into(), MetadataValue::from("CSCI"));
        metadata.insert("max_enrollment".into(), MetadataValue::from(40u32));

        let map = metadata_map(&metadata).unwrap();
        assert_eq!(map["department"], "CSCI");
        assert_eq!(map["max_enrollment"], 40);
    }

    #[test]
    fn test_client_errors_are_rejections() {
        let rejected = upsert_error(
            "CSCI 0150",
            PineconeError::Api { status: 400, message: "bad dimension".into() },
        );
        assert!(matches!(rejected, UpsertError::Rejected { ref id, .. } if id == "CSCI 0150"));

        let unavailable = upsert_error(
            "CSCI 0150",
            PineconeError::Api { status: 503, message: "down".into() },
        );
        assert!(matches!(unavailable, UpsertError::Index(_)));
    }

    #[tokio::test]
    async fn test_upsert_without_host_is_index_error() {
        let client = PineconeClient::new("key");
        let err = VectorIndex::upsert(&client, "CSCI 0150", &[0.1], &Metadata::new())
            .await
            .unwrap_err();
        assert!(matches!(err, UpsertError::Index(_)));
    }
}
