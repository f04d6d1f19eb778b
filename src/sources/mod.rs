//! Source collectors.
//!
//! Each collector is a thin client over one upstream API or feed. Collectors
//! produce [`RawRecord`]s and nothing else; all matching and policy lives in
//! the pipeline. `safe_collect` is the boundary the orchestrator uses: any
//! collector failure degrades to an empty batch plus a warning, so one broken
//! source never fails the run.

pub mod apple;
pub mod listen_notes;
pub mod podcast_index;
pub mod spotify;

use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use tracing::{info, warn};

use crate::episodes::{RawRecord, Source};
use crate::errors::CollectorError;

pub use apple::ApplePodcastsCollector;
pub use listen_notes::ListenNotesCollector;
pub use podcast_index::PodcastIndexCollector;
pub use spotify::SpotifyCollector;

/// User agent sent on every collector request.
pub(crate) const USER_AGENT: &str = "podsift/0.1";

/// Shared retry policy for transient HTTP failures.
pub(crate) fn retry_policy() -> backoff::ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(500))
        .with_max_elapsed_time(Some(Duration::from_secs(30)))
        .build()
}

/// A producer of raw episode records for one source.
#[async_trait]
pub trait EpisodeCollector: Send + Sync {
    fn source(&self) -> Source;

    /// Whether required credentials are present. Unconfigured collectors are
    /// skipped, not errors.
    fn is_configured(&self) -> bool;

    /// Fetch up to `max_episodes` raw records.
    async fn collect(&self, max_episodes: usize) -> Result<Vec<RawRecord>, CollectorError>;

    /// Collect, degrading every failure to an empty batch.
    async fn safe_collect(&self, max_episodes: usize) -> Vec<RawRecord> {
        if !self.is_configured() {
            warn!(source = %self.source(), "collector not configured, skipping");
            return Vec::new();
        }
        match self.collect(max_episodes).await {
            Ok(records) => {
                info!(source = %self.source(), count = records.len(), "collected episodes");
                records
            }
            Err(e) => {
                warn!(source = %self.source(), error = %e, "collection failed, continuing without source");
                Vec::new()
            }
        }
    }
}
