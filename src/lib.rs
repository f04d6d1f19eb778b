//! # podsift
//!
//! Aggregates podcast episode metadata from multiple heterogeneous sources,
//! merges records that describe the same underlying episode, and assigns each
//! surviving record to zero or more topical categories.
//!
//! ## Architecture
//!
//! - **Normalization**: heterogeneous raw records become a canonical,
//!   source-agnostic episode representation with a derived matching key
//! - **Deduplication**: union-find grouping over exact fingerprint matches
//!   plus fuzzy title similarity within the same show
//! - **Categorization**: data-driven keyword scoring against a configured
//!   category table, multi-label with ordered qualifiers
//!
//! Collectors ([`sources`]) and digest rendering/delivery ([`output`]) are
//! thin I/O layers around the pipeline; the pipeline itself is synchronous
//! and deterministic.

pub mod categories;
pub mod episodes;
pub mod errors;
pub mod types;

pub mod pipeline;
pub mod utils;

pub mod output;
pub mod sources;

// Re-export the main entry points.
pub use errors::{PodsiftError, Result};
pub use pipeline::{DigestRun, Pipeline, RunSummary};
pub use types::DigestConfig;
