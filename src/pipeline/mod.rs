//! The digest pipeline.
//!
//! Stages in order:
//! 1. **Normalize** — every raw record becomes a canonical episode (total,
//!    per-record irregularities degrade rather than fail)
//! 2. **Deduplicate** — one pass over the full cross-source set
//! 3. **Categorize** — each survivor scored against the category table
//!
//! The pipeline is synchronous and holds no state across runs; the only
//! fail-fast path is an empty or malformed category configuration, rejected
//! at construction before any processing starts.

pub mod categorize;
pub mod dedup;
pub mod normalize;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::categories::{Category, CategorySet};
use crate::episodes::{CategorizedEpisode, RawRecord, Source};
use crate::errors::Result;

use dedup::{deduplicate_with, DedupConfig, TitleMatcher, TokenSetOverlap};

/// Stage counts for one pipeline run, reported to output collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub raw_count: usize,
    pub deduplicated_count: usize,
    /// How many raw records were folded into another episode.
    pub merged_count: usize,
    /// Raw record counts per source, in source order.
    pub per_source: BTreeMap<Source, usize>,
    /// Qualifying episode counts per category, in declaration order.
    pub per_category: Vec<(String, usize)>,
    pub uncategorized_count: usize,
}

/// The categorized episode set plus its run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestRun {
    pub episodes: Vec<CategorizedEpisode>,
    pub summary: RunSummary,
}

/// Sequences normalization, deduplication, and categorization.
pub struct Pipeline {
    categories: CategorySet,
    dedup_config: DedupConfig,
    matcher: Box<dyn TitleMatcher + Send + Sync>,
}

impl Pipeline {
    /// Build a pipeline, compiling the category table.
    ///
    /// # Errors
    /// Returns [`crate::PodsiftError::Config`] when the table is empty or any
    /// pattern is malformed — the run is refused before processing starts.
    pub fn new(categories: &[Category], dedup_config: DedupConfig) -> Result<Self> {
        Ok(Self {
            categories: CategorySet::compile(categories)?,
            dedup_config,
            matcher: Box::new(TokenSetOverlap),
        })
    }

    /// Swap the fuzzy title-similarity policy.
    pub fn with_matcher(mut self, matcher: Box<dyn TitleMatcher + Send + Sync>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Run the full pipeline over the concatenated raw records of all
    /// sources.
    ///
    /// `fetch_time` is the fallback publish time for records whose timestamp
    /// cannot be parsed. Infallible: a source that contributed zero records
    /// shrinks the output, nothing more.
    pub fn run(&self, raw: &[RawRecord], fetch_time: DateTime<Utc>) -> DigestRun {
        let raw_count = raw.len();
        let mut per_source: BTreeMap<Source, usize> = BTreeMap::new();
        for record in raw {
            *per_source.entry(record.source).or_insert(0) += 1;
        }

        let normalized: Vec<_> = raw
            .iter()
            .map(|record| normalize::normalize(record, fetch_time))
            .collect();
        info!(raw = raw_count, "normalized episodes");

        let deduplicated =
            deduplicate_with(normalized, &self.dedup_config, self.matcher.as_ref());
        let deduplicated_count = deduplicated.len();
        info!(
            deduplicated = deduplicated_count,
            merged = raw_count - deduplicated_count,
            "deduplicated episodes"
        );

        let episodes: Vec<CategorizedEpisode> = deduplicated
            .iter()
            .map(|episode| categorize::categorize(episode, &self.categories))
            .collect();

        let mut per_category: Vec<(String, usize)> = self
            .categories
            .names()
            .into_iter()
            .map(|name| (name.to_string(), 0))
            .collect();
        let mut uncategorized_count = 0;
        for episode in &episodes {
            if episode.categories.is_empty() {
                uncategorized_count += 1;
            }
            for matched in &episode.categories {
                if let Some(entry) = per_category.iter_mut().find(|(n, _)| *n == matched.name) {
                    entry.1 += 1;
                }
            }
        }
        info!(
            categorized = deduplicated_count - uncategorized_count,
            uncategorized = uncategorized_count,
            "categorized episodes"
        );

        DigestRun {
            episodes,
            summary: RunSummary {
                raw_count,
                deduplicated_count,
                merged_count: raw_count - deduplicated_count,
                per_source,
                per_category,
                uncategorized_count,
            },
        }
    }
}
