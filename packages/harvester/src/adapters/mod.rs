//! Trait implementations for the hosted providers.
//!
//! Each adapter sits behind a cargo feature so the core library builds
//! without any provider client.

#[cfg(feature = "pinecone")]
pub mod pinecone;
#[cfg(feature = "vertex")]
pub mod vertex;
