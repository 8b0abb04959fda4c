//! Typed errors for the harvester library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so the traversal driver
//! can decide, per error kind, whether to skip an entry or abort the run.

use std::time::Duration;

use thiserror::Error;

/// Errors reported by a rendering surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// No element matched the locator
    #[error("element not found: {locator}")]
    NotFound { locator: String },

    /// Element did not appear within the allotted time
    #[error("timed out after {timeout:?} waiting for {locator}")]
    Timeout { locator: String, timeout: Duration },

    /// Browser driver or transport failure
    #[error("driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Driver answered with something we could not interpret
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Errors raised while reading fields from an open detail view.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// A required field was absent or empty
    #[error("missing required field: {field}")]
    MissingRequiredField { field: &'static str },

    /// The surface failed while reading a required field
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),
}

/// Errors raised while moving between the list and detail views.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// The catalog list could not be opened at all
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(#[source] SurfaceError),

    /// The detail view did not appear in time
    #[error("detail view did not appear within {timeout:?} ({locator})")]
    Timeout { locator: String, timeout: Duration },

    /// Returning to the list view failed
    #[error("failed to return to list view: {0}")]
    RecoveryFault(#[source] SurfaceError),
}

/// Why a single catalog entry produced no record.
#[derive(Debug, Error)]
pub enum EntryError {
    /// The detail view never appeared
    #[error(transparent)]
    NavigationTimeout(NavigationError),

    /// Scrolling to or clicking the entry failed
    #[error("interaction failed: {0}")]
    Interaction(#[source] SurfaceError),

    /// The detail view appeared but a record could not be built
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
}

/// Errors from credential acquisition.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Required credential material is not configured
    #[error("missing credential: {0}")]
    Missing(String),

    /// Credential material is present but unusable
    #[error("invalid credential: {0}")]
    InvalidKey(String),

    /// Token exchange with the identity provider failed
    #[error("token exchange failed: {0}")]
    Exchange(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors from embedding a record.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Could not obtain an access token
    #[error("credentials error: {0}")]
    Credentials(#[from] CredentialError),

    /// Transport or provider failure
    #[error("embedding provider error: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Provider returned an unusable payload
    #[error("malformed embedding response: {0}")]
    Malformed(String),
}

/// Errors from writing to the vector index.
#[derive(Debug, Error)]
pub enum UpsertError {
    /// Transport or index failure
    #[error("index error: {0}")]
    Index(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The index refused the vector
    #[error("upsert rejected for {id}: {reason}")]
    Rejected { id: String, reason: String },
}

/// Why a single record was not indexed.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Upsert(#[from] UpsertError),
}

/// Errors in library configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A free-text pattern failed to compile
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type alias for surface operations.
pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;

/// Result type alias for credential operations.
pub type CredentialResult<T> = std::result::Result<T, CredentialError>;

/// Result type alias for embedding operations.
pub type EmbeddingResult<T> = std::result::Result<T, EmbeddingError>;

/// Result type alias for upsert operations.
pub type UpsertResult<T> = std::result::Result<T, UpsertError>;
