//! Writes embedded records to a vector index.

use tracing::debug;

use crate::error::UpsertResult;
use crate::traits::index::{Metadata, MetadataValue, VectorIndex};
use crate::types::record::CourseRecord;

/// Which derived fields to include in the written metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataOptions {
    /// Add `course_number` and `level_band` when derivable from the id
    pub level_fields: bool,
}

impl MetadataOptions {
    pub fn with_level_fields(mut self, enabled: bool) -> Self {
        self.level_fields = enabled;
        self
    }
}

/// Metadata for a record, omitting every absent optional value.
pub fn record_metadata(record: &CourseRecord, options: MetadataOptions) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("title".into(), record.title().into());
    metadata.insert("description".into(), record.description().into());
    metadata.insert("department".into(), record.department().into());
    metadata.insert("prerequisites".into(), record.prerequisites().into());

    if let Some(max) = record.max_enrollment() {
        metadata.insert("max_enrollment".into(), MetadataValue::Integer(max));
    }
    if let Some(seats) = record.seats_available() {
        metadata.insert("seats_available".into(), MetadataValue::Integer(seats));
    }

    if options.level_fields {
        if let Some(number) = record.course_number() {
            metadata.insert("course_number".into(), MetadataValue::Integer(number));
        }
        if let Some(band) = record.level_band() {
            metadata.insert("level_band".into(), band.into());
        }
    }

    metadata
}

/// Upserts `(id, vector, metadata)` tuples into an index.
pub struct UpsertSink<I> {
    index: I,
    options: MetadataOptions,
}

impl<I: VectorIndex> UpsertSink<I> {
    pub fn new(index: I) -> Self {
        Self {
            index,
            options: MetadataOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MetadataOptions) -> Self {
        self.options = options;
        self
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// Write one record. Upserting the same id again overwrites it.
    pub async fn upsert(&self, id: &str, vector: &[f32], record: &CourseRecord) -> UpsertResult<()> {
        let metadata = record_metadata(record, self.options);
        self.index.upsert(id, vector, &metadata).await?;
        debug!(id, index = self.index.name(), "Upserted record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryIndex;

    #[test]
    fn test_absent_numbers_omitted() {
        let record = CourseRecord::new("CSCI 1234", "X", "Y")
            .unwrap()
            .with_seats_available(Some(5));

        let metadata = record_metadata(&record, MetadataOptions::default());
        let json = serde_json::to_value(&metadata).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "title": "X",
                "description": "Y",
                "department": "CSCI",
                "prerequisites": "",
                "seats_available": 5,
            })
        );
        assert!(!metadata.contains_key("max_enrollment"));
    }

    #[test]
    fn test_zero_is_kept_when_present() {
        let record = CourseRecord::new("CSCI 1234", "X", "Y")
            .unwrap()
            .with_max_enrollment(Some(0))
            .with_seats_available(Some(0));

        let metadata = record_metadata(&record, MetadataOptions::default());
        assert_eq!(metadata.get("max_enrollment"), Some(&MetadataValue::Integer(0)));
        assert_eq!(metadata.get("seats_available"), Some(&MetadataValue::Integer(0)));
    }

    #[test]
    fn test_level_fields() {
        let record = CourseRecord::new("ENGN 2520", "X", "Y").unwrap();
        let options = MetadataOptions::default().with_level_fields(true);

        let metadata = record_metadata(&record, options);
        assert_eq!(metadata.get("course_number"), Some(&MetadataValue::Integer(2520)));
        assert_eq!(
            metadata.get("level_band"),
            Some(&MetadataValue::Text("2000-2999".to_string()))
        );

        let unnumbered = CourseRecord::new("ENGN", "X", "Y").unwrap();
        let metadata = record_metadata(&unnumbered, options);
        assert!(!metadata.contains_key("course_number"));
        assert!(!metadata.contains_key("level_band"));
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let sink = UpsertSink::new(MemoryIndex::new());
        let record = CourseRecord::new("CSCI 1234", "X", "Y").unwrap();

        sink.upsert("CSCI 1234", &[0.5, 0.5], &record).await.unwrap();
        sink.upsert("CSCI 1234", &[0.5, 0.5], &record).await.unwrap();

        assert_eq!(sink.index().len(), 1);
        let stored = sink.index().get("CSCI 1234").unwrap();
        assert_eq!(stored.values, vec![0.5, 0.5]);
        assert_eq!(stored.metadata, record_metadata(&record, MetadataOptions::default()));
    }
}
