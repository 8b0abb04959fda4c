//! The embed + upsert loop over scraped records.

use tracing::{info, warn};

use crate::error::IngestError;
use crate::pipeline::{embedding::EmbeddingPipeline, sink::UpsertSink};
use crate::traits::{
    credentials::CredentialProvider, embedder::EmbeddingClient, index::VectorIndex,
};
use crate::types::record::CourseRecord;

/// A record that could not be indexed.
#[derive(Debug)]
pub struct IngestFailure {
    pub id: String,
    pub reason: IngestError,
}

/// Result of indexing a batch of records.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub upserted: usize,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

/// Embed and upsert each record independently.
///
/// A failure on one record is logged and recorded; the loop always continues.
pub async fn index_records<P, C, I>(
    records: &[CourseRecord],
    pipeline: &EmbeddingPipeline<P, C>,
    sink: &UpsertSink<I>,
) -> IngestReport
where
    P: CredentialProvider,
    C: EmbeddingClient,
    I: VectorIndex,
{
    let mut report = IngestReport::default();

    for record in records {
        match index_one(record, pipeline, sink).await {
            Ok(()) => report.upserted += 1,
            Err(e) => {
                warn!("Error processing {}: {}", record.id(), e);
                report.failures.push(IngestFailure {
                    id: record.id().to_string(),
                    reason: e,
                });
            }
        }
    }

    info!(
        upserted = report.upserted,
        failed = report.failed_count(),
        "Indexing complete"
    );
    report
}

async fn index_one<P, C, I>(
    record: &CourseRecord,
    pipeline: &EmbeddingPipeline<P, C>,
    sink: &UpsertSink<I>,
) -> Result<(), IngestError>
where
    P: CredentialProvider,
    C: EmbeddingClient,
    I: VectorIndex,
{
    let vector = pipeline.embed(record).await?;
    sink.upsert(record.id(), &vector, record).await?;
    Ok(())
}
