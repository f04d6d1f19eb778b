//! Cross-source deduplication.
//!
//! Two matching tiers feed a union-find grouping:
//! 1. **Primary** — identical fingerprints always merge.
//! 2. **Fuzzy** — within the same show (or same non-empty publisher), titles
//!    whose token-set overlap meets the threshold and whose publish times fall
//!    within the window merge.
//!
//! Chains of fuzzy matches merge transitively through the disjoint set, but a
//! match is only ever decided between a concrete pair — there is no closure
//! beyond the grouping itself.

use std::collections::HashMap;

use tracing::debug;

use crate::episodes::CanonicalEpisode;
use crate::utils::similarity::token_set_overlap;

/// Deduplication thresholds for one run.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Minimum title similarity in `[0, 1]` for a fuzzy match.
    pub similarity_threshold: f64,
    /// Maximum publish-time distance for a fuzzy match.
    pub time_window: chrono::Duration,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            time_window: chrono::Duration::hours(48),
        }
    }
}

/// The fuzzy title-similarity policy.
///
/// The exact string-distance algorithm is deliberately swappable; the
/// deduplicator only requires a score in `[0, 1]` over two match-normalized
/// titles.
pub trait TitleMatcher {
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Default matcher: token-set overlap (Jaccard index over whitespace tokens).
#[derive(Debug, Default)]
pub struct TokenSetOverlap;

impl TitleMatcher for TokenSetOverlap {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        token_set_overlap(a, b)
    }
}

/// Disjoint set with path compression, keyed by indices into the episode
/// sequence.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            // Path halving.
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            // Attach the later root under the earlier one so group roots stay
            // stable in first-seen order.
            let (keep, absorb) = if root_a < root_b {
                (root_a, root_b)
            } else {
                (root_b, root_a)
            };
            self.parent[absorb] = keep;
        }
    }
}

/// Deduplicate with the default token-set matcher.
pub fn deduplicate(episodes: Vec<CanonicalEpisode>, config: &DedupConfig) -> Vec<CanonicalEpisode> {
    deduplicate_with(episodes, config, &TokenSetOverlap)
}

/// Deduplicate a normalized episode sequence.
///
/// Output order is the insertion order of each group's first-seen member.
/// Every input's source refs survive in exactly one output episode, and no
/// two outputs share a fingerprint.
///
/// Merging moves the representative's publish time to the group's earliest
/// and can change its title, which can expose fuzzy matches no original pair
/// had. Passes repeat until one makes no merge, so the result is a fixed
/// point: deduplicating it again changes nothing.
pub fn deduplicate_with(
    episodes: Vec<CanonicalEpisode>,
    config: &DedupConfig,
    matcher: &dyn TitleMatcher,
) -> Vec<CanonicalEpisode> {
    let mut episodes = episodes;
    loop {
        let before = episodes.len();
        episodes = dedup_pass(episodes, config, matcher);
        // A pass that merged nothing leaves the sequence untouched.
        if episodes.len() == before {
            return episodes;
        }
    }
}

/// One grouping-and-collapse pass over the sequence.
fn dedup_pass(
    episodes: Vec<CanonicalEpisode>,
    config: &DedupConfig,
    matcher: &dyn TitleMatcher,
) -> Vec<CanonicalEpisode> {
    let n = episodes.len();
    if n <= 1 {
        return episodes;
    }

    let mut groups = DisjointSet::new(n);

    // Primary tier: identical fingerprints.
    let mut first_seen: HashMap<&str, usize> = HashMap::with_capacity(n);
    for (i, episode) in episodes.iter().enumerate() {
        match first_seen.get(episode.fingerprint.as_str()) {
            Some(&j) => groups.union(j, i),
            None => {
                first_seen.insert(episode.fingerprint.as_str(), i);
            }
        }
    }

    // Fuzzy tier: pairwise within show/publisher scope.
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (&episodes[i], &episodes[j]);
            if a.fingerprint != b.fingerprint && is_fuzzy_duplicate(a, b, config, matcher) {
                debug!(
                    left = %a.title,
                    right = %b.title,
                    show = %a.show_name,
                    "fuzzy duplicate"
                );
                groups.union(i, j);
            }
        }
    }

    drop(first_seen);

    // Collapse each group onto its first-seen representative.
    let mut representative_of: HashMap<usize, usize> = HashMap::new();
    let mut output: Vec<CanonicalEpisode> = Vec::new();
    for (i, episode) in episodes.into_iter().enumerate() {
        let root = groups.find(i);
        match representative_of.get(&root) {
            Some(&slot) => merge_into(&mut output[slot], episode),
            None => {
                representative_of.insert(root, output.len());
                output.push(episode);
            }
        }
    }

    output
}

/// Decide whether two episodes with differing fingerprints describe the same
/// real-world episode.
fn is_fuzzy_duplicate(
    a: &CanonicalEpisode,
    b: &CanonicalEpisode,
    config: &DedupConfig,
    matcher: &dyn TitleMatcher,
) -> bool {
    // Empty titles never fuzzy-match: missing data must not glue shows
    // together. (Two empty titles under the same show still merge through
    // the primary key.)
    if a.match_title.is_empty() || b.match_title.is_empty() {
        return false;
    }

    // Same show under match normalization, or same non-empty publisher.
    let same_show = !a.match_show.is_empty() && a.match_show == b.match_show;
    let same_publisher = !a.publisher.is_empty()
        && a.publisher.eq_ignore_ascii_case(&b.publisher);
    if !(same_show || same_publisher) {
        return false;
    }

    if matcher.similarity(&a.match_title, &b.match_title) < config.similarity_threshold {
        return false;
    }

    let gap = (a.published_at - b.published_at).abs();
    gap <= config.time_window
}

/// Merge `other` into the group representative.
///
/// The more complete member (longer non-empty description, then completeness
/// score) supplies the field values; source refs are unioned and the earliest
/// publish time wins.
fn merge_into(representative: &mut CanonicalEpisode, other: CanonicalEpisode) {
    let earliest = representative.published_at.min(other.published_at);

    if prefer(&other, representative) {
        let mut merged = other;
        merged.sources.append(&mut representative.sources);
        merged.published_at = earliest;
        *representative = merged;
    } else {
        representative.sources.extend(other.sources);
        representative.published_at = earliest;
    }
}

/// True when `candidate` should replace `current` as the value-bearing member.
fn prefer(candidate: &CanonicalEpisode, current: &CanonicalEpisode) -> bool {
    let candidate_len = candidate.description.chars().count();
    let current_len = current.description.chars().count();
    if candidate_len != current_len {
        return candidate_len > current_len;
    }
    candidate.completeness() > current.completeness()
}
