//! Keyword-driven categorization.

use crate::categories::CategorySet;
use crate::episodes::{CanonicalEpisode, CategorizedEpisode, CategoryMatch};

/// Score one episode against the compiled category table.
///
/// Pure. Each pattern that matches anywhere in title + description
/// contributes its weight once, regardless of how often it occurs; a category
/// qualifies when its total meets its minimum score. Qualifiers are sorted
/// best score first, ties broken by declaration order. No qualifier leaves
/// `categories` empty — the episode is retained as uncategorized, never
/// dropped.
pub fn categorize(episode: &CanonicalEpisode, categories: &CategorySet) -> CategorizedEpisode {
    let text = format!("{} {}", episode.title, episode.description);

    let mut qualifying: Vec<(usize, CategoryMatch)> = Vec::new();
    for (position, category) in categories.iter().enumerate() {
        let mut score = 0u32;
        for pattern in &category.patterns {
            if pattern.regex.is_match(&text) {
                score += pattern.weight;
            }
        }
        if score >= category.min_score {
            qualifying.push((
                position,
                CategoryMatch {
                    name: category.name.clone(),
                    score,
                },
            ));
        }
    }

    qualifying.sort_by(|(pos_a, a), (pos_b, b)| b.score.cmp(&a.score).then(pos_a.cmp(pos_b)));

    CategorizedEpisode {
        episode: episode.clone(),
        categories: qualifying.into_iter().map(|(_, m)| m).collect(),
    }
}
