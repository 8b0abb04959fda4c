//! Embedding and indexing pipeline.
//!
//! Consumes the records produced by traversal:
//! record → text blob → embedding (with cached credentials) → metadata → upsert.

pub mod embedding;
pub mod ingest;
pub mod sink;
pub mod token_cache;

pub use embedding::{embedding_text, EmbeddingPipeline};
pub use ingest::{index_records, IngestFailure, IngestReport};
pub use sink::{record_metadata, MetadataOptions, UpsertSink};
pub use token_cache::{Clock, SystemClock, TokenCache, REFRESH_MARGIN_MINUTES};
