//! Data types for the harvester library.

pub mod config;
pub mod outcome;
pub mod record;
