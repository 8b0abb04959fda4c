//! Course Catalog Harvester
//!
//! Walks a JavaScript-rendered course catalog through a browser surface,
//! extracts one structured record per course, then embeds each record and
//! upserts it into a vector index with flat metadata.
//!
//! # Design Philosophy
//!
//! - One entry's failure never stops the run; only an unreachable catalog does
//! - Every record carries its id, title and description, or it is not emitted
//! - Optional fields are absent rather than guessed
//! - Browser, embedding provider, credentials and index are all traits
//!
//! # Usage
//!
//! ```rust,ignore
//! use harvester::{FieldExtractor, TraversalConfig, TraversalEngine};
//! use harvester::surfaces::{WebDriverConfig, WebDriverSurface};
//! use harvester::pipeline::{index_records, EmbeddingPipeline, UpsertSink};
//!
//! let surface = WebDriverSurface::connect(WebDriverConfig::new("http://localhost:9515")).await?;
//! let engine = TraversalEngine::new(
//!     surface,
//!     FieldExtractor::with_defaults()?,
//!     TraversalConfig::new("https://cab.brown.edu/"),
//! );
//! let report = engine.run().await?;
//!
//! let pipeline = EmbeddingPipeline::new(credentials, embedder);
//! let sink = UpsertSink::new(index);
//! let ingest = index_records(&report.records, &pipeline, &sink).await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Surface, credential, embedding and index abstractions
//! - [`types`] - Records, selectors, traversal config and outcomes
//! - [`extractor`] - Field extraction from an open detail view
//! - [`traversal`] - The list → detail → back loop
//! - [`pipeline`] - Token cache, embedding and upsert
//! - [`surfaces`] - WebDriver browser surface
//! - [`adapters`] - Vertex AI and Pinecone implementations (feature-gated)
//! - [`security`] - Redacted secrets and access tokens
//! - [`testing`] - In-memory fakes for tests

pub mod adapters;
pub mod catalog;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod security;
pub mod surfaces;
pub mod testing;
pub mod traits;
pub mod traversal;
pub mod types;

// Re-export core types at crate root
pub use error::{
    ConfigError, CredentialError, EmbeddingError, EntryError, ExtractionError, IngestError,
    NavigationError, SurfaceError, UpsertError,
};
pub use traits::{
    credentials::CredentialProvider,
    embedder::EmbeddingClient,
    index::{Metadata, MetadataValue, VectorIndex},
    surface::{Locator, Pick, Surface},
};
pub use types::{
    config::{CatalogSelectors, EnrollmentPatterns, TraversalConfig},
    outcome::{EntryFailure, ExtractionResult, TraversalReport},
    record::CourseRecord,
};

pub use catalog::{CatalogEntry, CatalogView};
pub use extractor::FieldExtractor;
pub use security::{AccessToken, SecretString};
pub use traversal::{visit_limit, TraversalEngine};

// Re-export pipeline components
pub use pipeline::{
    embedding_text, index_records, record_metadata, EmbeddingPipeline, IngestReport,
    MetadataOptions, TokenCache, UpsertSink,
};
