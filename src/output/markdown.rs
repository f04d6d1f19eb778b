//! Markdown rendering of a digest run.

use chrono::{DateTime, Utc};

use crate::episodes::CategorizedEpisode;
use crate::pipeline::DigestRun;
use crate::utils::datetime::format_duration;

/// Render the run as a markdown digest.
///
/// Episodes are grouped under their best (first) category, in the category
/// table's declaration order; an "Uncategorized" section comes last. Within a
/// section, episodes run newest first, capped at `max_per_category`.
pub fn render_digest(run: &DigestRun, date: DateTime<Utc>, max_per_category: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Podcast Digest — {}\n\n",
        date.format("%B %d, %Y")
    ));
    out.push_str(&format!(
        "_{} episodes from {} raw records across {} sources._\n",
        run.summary.deduplicated_count,
        run.summary.raw_count,
        run.summary.per_source.len()
    ));

    for (category, _) in &run.summary.per_category {
        let members: Vec<&CategorizedEpisode> = run
            .episodes
            .iter()
            .filter(|e| e.best_category() == Some(category.as_str()))
            .collect();
        render_section(&mut out, category, &members, max_per_category);
    }

    let uncategorized: Vec<&CategorizedEpisode> = run
        .episodes
        .iter()
        .filter(|e| e.categories.is_empty())
        .collect();
    render_section(&mut out, "uncategorized", &uncategorized, max_per_category);

    out
}

fn render_section(
    out: &mut String,
    category: &str,
    members: &[&CategorizedEpisode],
    max_per_category: usize,
) {
    if members.is_empty() || max_per_category == 0 {
        return;
    }

    out.push_str(&format!("\n## {}\n\n", section_title(category)));

    let mut sorted = members.to_vec();
    sorted.sort_by(|a, b| b.episode.published_at.cmp(&a.episode.published_at));

    for categorized in sorted.into_iter().take(max_per_category) {
        let episode = &categorized.episode;
        match &episode.episode_url {
            Some(url) => out.push_str(&format!("- **[{}]({})**", episode.title, url)),
            None => out.push_str(&format!("- **{}**", episode.title)),
        }
        out.push_str(&format!(" — {}", episode.show_name));
        if let Some(duration) = episode.duration_seconds {
            out.push_str(&format!(" ({})", format_duration(duration)));
        }
        out.push('\n');
        if !episode.description.is_empty() {
            out.push_str(&format!("  {}\n", episode.description));
        }
    }
}

/// `sleep_management` → `Sleep Management`.
fn section_title(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
