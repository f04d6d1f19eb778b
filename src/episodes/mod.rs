//! Episode data model.
//!
//! Three shapes, one per pipeline stage boundary:
//! - [`RawRecord`] — source-specific payload as fetched
//! - [`CanonicalEpisode`] — normalized, source-agnostic, dedup-ready
//! - [`CategorizedEpisode`] — terminal shape handed to output collaborators

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifies which upstream API or feed a record came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    PodcastIndex,
    ApplePodcasts,
    Spotify,
    ListenNotes,
}

impl Source {
    /// Stable string form, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::PodcastIndex => "podcast_index",
            Source::ApplePodcasts => "apple_podcasts",
            Source::Spotify => "spotify",
            Source::ListenNotes => "listen_notes",
        }
    }

    /// Merge tie-break priority: richer sources win when two duplicate
    /// records are otherwise equally complete.
    pub fn priority(&self) -> u8 {
        match self {
            Source::PodcastIndex => 3,
            Source::Spotify => 2,
            Source::ApplePodcasts => 1,
            Source::ListenNotes => 0,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source-scoped episode identity, preserved through merges.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SourceRef {
    pub source: Source,
    pub external_id: String,
}

impl SourceRef {
    pub fn new(source: Source, external_id: impl Into<String>) -> Self {
        Self {
            source,
            external_id: external_id.into(),
        }
    }
}

/// A source-specific episode payload, immutable once fetched.
///
/// `published_at` stays a raw string here because every source emits a
/// different timestamp format; the normalizer owns the parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub source: Source,
    pub external_id: String,
    pub title: String,
    pub show_title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<String>,
    pub duration_seconds: Option<u32>,
    pub episode_url: Option<String>,
    pub audio_url: Option<String>,
}

/// A normalized, source-agnostic episode.
///
/// Created by the normalizer from exactly one [`RawRecord`]; mutated only by
/// the deduplicator when merging (union of `sources`, field values from the
/// most complete member, earliest `published_at`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEpisode {
    /// Display title — trimmed, case preserved.
    pub title: String,
    /// Display show name — trimmed, case preserved.
    pub show_name: String,
    /// Show author/publisher; empty when the source provided none.
    pub publisher: String,
    /// HTML-stripped plain-text description, truncated at a word boundary.
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub duration_seconds: Option<u32>,
    pub episode_url: Option<String>,
    pub audio_url: Option<String>,
    /// Every {source, external id} pair merged into this episode. Non-empty.
    pub sources: BTreeSet<SourceRef>,
    /// Primary dedup key derived from the match-normalized show and title.
    pub fingerprint: String,
    /// Lowercased, punctuation-stripped title. Matching aid, not display.
    pub match_title: String,
    /// Lowercased, punctuation-stripped show name. Matching aid, not display.
    pub match_show: String,
}

impl CanonicalEpisode {
    /// Completeness score used as the merge tie-break when two duplicates
    /// have equally long descriptions. Richer metadata and higher-priority
    /// sources win.
    pub fn completeness(&self) -> u32 {
        let mut score = 0u32;
        if self.description.chars().count() > 50 {
            score += 2;
        }
        if self.duration_seconds.is_some() {
            score += 1;
        }
        if self.episode_url.is_some() {
            score += 1;
        }
        if self.audio_url.is_some() {
            score += 1;
        }
        score += self
            .sources
            .iter()
            .map(|r| r.source.priority() as u32)
            .max()
            .unwrap_or(0);
        score
    }
}

/// A qualifying category membership with its match score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMatch {
    pub name: String,
    pub score: u32,
}

/// A canonical episode plus its category memberships, best score first.
///
/// `categories` is empty only when no configured category met its minimum
/// threshold; such episodes are retained as uncategorized, never dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedEpisode {
    #[serde(flatten)]
    pub episode: CanonicalEpisode,
    pub categories: Vec<CategoryMatch>,
}

impl CategorizedEpisode {
    /// The best-scoring category name, if any qualified.
    pub fn best_category(&self) -> Option<&str> {
        self.categories.first().map(|m| m.name.as_str())
    }
}
