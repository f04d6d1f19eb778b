//! Normalization: raw source payloads → canonical episodes.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::episodes::{CanonicalEpisode, RawRecord, SourceRef};
use crate::utils::datetime::parse_flexible_datetime;
use crate::utils::text::{char_prefix, clean_text, normalize_for_matching, truncate_at_word};

/// Maximum description length kept after normalization, in characters.
const MAX_DESCRIPTION_CHARS: usize = 500;

/// Fingerprint component widths. Keeping the key short makes it resilient to
/// sources that append trailing noise to long show or episode titles.
const FINGERPRINT_SHOW_CHARS: usize = 30;
const FINGERPRINT_TITLE_CHARS: usize = 50;

/// Build the primary dedup key from match-normalized show and title text.
pub fn make_fingerprint(match_show: &str, match_title: &str) -> String {
    format!(
        "{}|{}",
        char_prefix(match_show, FINGERPRINT_SHOW_CHARS),
        char_prefix(match_title, FINGERPRINT_TITLE_CHARS)
    )
}

/// Convert one raw record into a canonical episode.
///
/// Pure and total: malformed or missing optional fields degrade to empty
/// values, and an unparseable publish timestamp degrades to `fetch_time`
/// (logged at debug). The output carries its fingerprint and match fields, so
/// it is dedup-ready.
pub fn normalize(raw: &RawRecord, fetch_time: DateTime<Utc>) -> CanonicalEpisode {
    let title = clean_text(&raw.title);
    let show_name = clean_text(&raw.show_title);
    let publisher = raw.author.as_deref().map(clean_text).unwrap_or_default();
    let description = truncate_at_word(
        &clean_text(raw.description.as_deref().unwrap_or_default()),
        MAX_DESCRIPTION_CHARS,
    );

    let published_at = match raw.published_at.as_deref() {
        Some(ts) => parse_flexible_datetime(ts).unwrap_or_else(|| {
            debug!(
                source = %raw.source,
                external_id = %raw.external_id,
                timestamp = ts,
                "unparseable publish timestamp, defaulting to fetch time"
            );
            fetch_time
        }),
        None => fetch_time,
    };

    let match_title = normalize_for_matching(&title);
    let match_show = normalize_for_matching(&show_name);
    let fingerprint = make_fingerprint(&match_show, &match_title);

    CanonicalEpisode {
        title,
        show_name,
        publisher,
        description,
        published_at,
        duration_seconds: raw.duration_seconds,
        episode_url: raw.episode_url.clone(),
        audio_url: raw.audio_url.clone(),
        sources: BTreeSet::from([SourceRef::new(raw.source, raw.external_id.clone())]),
        fingerprint,
        match_title,
        match_show,
    }
}
