//! Title similarity for fuzzy deduplication.

use std::collections::BTreeSet;

/// Compute the token-set overlap (Jaccard index) between two strings.
///
/// Tokens are whitespace-separated; callers are expected to pass
/// match-normalized text (lowercased, punctuation stripped). Returns a value
/// in `[0.0, 1.0]`; `0.0` when either input has no tokens.
pub fn token_set_overlap(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();

    intersection as f64 / union as f64
}
