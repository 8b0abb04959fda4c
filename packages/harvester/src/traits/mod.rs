//! Core trait abstractions for the harvester library.
//!
//! These traits define the collaborators the engine consumes: the rendering
//! surface, the credential source, the embedding provider and the vector index.

pub mod credentials;
pub mod embedder;
pub mod index;
pub mod surface;
