//! End-to-end tests for the digest pipeline: normalization, cross-source
//! deduplication, and categorization over realistic multi-source batches.

use chrono::{DateTime, TimeZone, Utc};
use podsift::categories::Category;
use podsift::episodes::{RawRecord, Source};
use podsift::pipeline::dedup::{DedupConfig, TitleMatcher};
use podsift::pipeline::{DigestRun, Pipeline};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fetch_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 16, 8, 0, 0).unwrap()
}

/// Build a raw record with required fields only.
fn raw(source: Source, id: &str, title: &str, show: &str) -> RawRecord {
    RawRecord {
        source,
        external_id: id.to_string(),
        title: title.to_string(),
        show_title: show.to_string(),
        author: None,
        description: None,
        published_at: Some("2024-01-15T10:00:00Z".to_string()),
        duration_seconds: None,
        episode_url: None,
        audio_url: None,
    }
}

fn test_categories() -> Vec<Category> {
    vec![
        Category::new("tech_startups", &["startup", "ai", "venture capital"]),
        Category::new("business_finance", &["market", "invest", "stocks"]),
        Category::new("health_longevity", &["sleep", "longevity", "nutrition"]),
    ]
}

fn pipeline() -> Pipeline {
    Pipeline::new(&test_categories(), DedupConfig::default()).expect("pipeline builds")
}

fn run(records: Vec<RawRecord>) -> DigestRun {
    pipeline().run(&records, fetch_time())
}

// ---------------------------------------------------------------------------
// Cross-source merging
// ---------------------------------------------------------------------------

#[test]
fn test_same_episode_across_sources_merges() {
    // Punctuation and casing differ, but both normalize to the same
    // show/title fingerprint.
    let mut spotify = raw(Source::Spotify, "sp1", "Ep 42: AI News", "The Tech Show");
    spotify.description = Some("Short blurb.".to_string());
    let mut index = raw(
        Source::PodcastIndex,
        "pi1",
        "ep. 42 - ai news",
        "Tech Show",
    );
    index.description =
        Some("A much longer rundown of this week's AI stories and what they mean.".to_string());
    index.duration_seconds = Some(2700);

    let digest = run(vec![spotify, index]);

    assert_eq!(digest.summary.raw_count, 2);
    assert_eq!(digest.summary.deduplicated_count, 1);
    assert_eq!(digest.summary.merged_count, 1);

    let episode = &digest.episodes[0].episode;
    assert_eq!(episode.sources.len(), 2);
    // Longer description wins the merge.
    assert!(episode.description.starts_with("A much longer rundown"));
    assert_eq!(episode.duration_seconds, Some(2700));
}

#[test]
fn test_merged_episode_keeps_earliest_publish_time() {
    let mut early = raw(Source::ApplePodcasts, "a1", "Morning Brief", "Daily Show");
    early.published_at = Some("2024-01-15T06:00:00Z".to_string());
    let mut late = raw(Source::Spotify, "s1", "Morning Brief", "Daily Show");
    late.published_at = Some("2024-01-15T09:30:00Z".to_string());

    let digest = run(vec![late, early]);

    assert_eq!(digest.episodes.len(), 1);
    assert_eq!(
        digest.episodes[0].episode.published_at,
        Utc.with_ymd_and_hms(2024, 1, 15, 6, 0, 0).unwrap()
    );
}

#[test]
fn test_fuzzy_merge_within_window_and_show() {
    let mut a = raw(
        Source::Spotify,
        "s1",
        "Interview with Dr Jane Smith on Sleep Science",
        "Health Hour",
    );
    a.published_at = Some("2024-01-15T10:00:00Z".to_string());
    let mut b = raw(
        Source::ListenNotes,
        "ln1",
        "Interview with Dr Jane Smith on Sleep Science Research",
        "Health Hour",
    );
    b.published_at = Some("2024-01-14T22:00:00Z".to_string());

    let digest = run(vec![a, b]);
    assert_eq!(digest.summary.deduplicated_count, 1);
    assert_eq!(digest.episodes[0].episode.sources.len(), 2);
}

#[test]
fn test_similar_titles_below_threshold_stay_distinct() {
    // Token-set overlap of these two is well under the default 0.85.
    let a = raw(Source::Spotify, "s1", "Weekly Markets Update", "Money Talk");
    let b = raw(
        Source::Spotify,
        "s2",
        "Weekly Update on Crypto and Bonds",
        "Money Talk",
    );

    let digest = run(vec![a, b]);
    assert_eq!(digest.summary.deduplicated_count, 2);
    assert_eq!(digest.summary.merged_count, 0);
}

#[test]
fn test_fuzzy_merge_respects_show_scope() {
    // Near-identical titles on unrelated shows are different episodes.
    let a = raw(Source::Spotify, "s1", "Season Finale Special Edition", "Show Alpha");
    let b = raw(Source::Spotify, "s2", "Season Finale Special Editions", "Show Beta");

    let digest = run(vec![a, b]);
    assert_eq!(digest.summary.deduplicated_count, 2);
}

#[test]
fn test_deduplication_is_idempotent() {
    let records = vec![
        raw(Source::Spotify, "s1", "Ep 42: AI News", "The Tech Show"),
        raw(Source::PodcastIndex, "pi1", "ep. 42 - ai news", "Tech Show"),
        raw(Source::Spotify, "s2", "Weekly Markets Update", "Money Talk"),
    ];

    let first = run(records);
    let survivors: Vec<RawRecord> = first
        .episodes
        .iter()
        .map(|c| {
            let e = &c.episode;
            RawRecord {
                source: Source::Spotify,
                external_id: e.fingerprint.clone(),
                title: e.title.clone(),
                show_title: e.show_name.clone(),
                author: None,
                description: Some(e.description.clone()),
                published_at: Some(e.published_at.to_rfc3339()),
                duration_seconds: e.duration_seconds,
                episode_url: e.episode_url.clone(),
                audio_url: e.audio_url.clone(),
            }
        })
        .collect();

    let second = run(survivors);
    assert_eq!(second.summary.deduplicated_count, first.summary.deduplicated_count);
    assert_eq!(second.summary.merged_count, 0);
}

#[test]
fn test_output_fingerprints_are_unique() {
    let records = vec![
        raw(Source::Spotify, "1", "Ep 42: AI News", "The Tech Show"),
        raw(Source::ApplePodcasts, "2", "ep 42 ai news", "tech show"),
        raw(Source::Spotify, "3", "Weekly Markets Update", "Money Talk"),
        raw(Source::ListenNotes, "4", "Sleep Science Basics", "Health Hour"),
    ];

    let digest = run(records);
    let mut fingerprints: Vec<&str> = digest
        .episodes
        .iter()
        .map(|c| c.episode.fingerprint.as_str())
        .collect();
    fingerprints.sort_unstable();
    fingerprints.dedup();
    assert_eq!(fingerprints.len(), digest.episodes.len());
}

// ---------------------------------------------------------------------------
// Categorization
// ---------------------------------------------------------------------------

#[test]
fn test_each_matching_pattern_contributes_weight_once() {
    let mut record = raw(Source::Spotify, "s1", "AI and the Startup Economy", "Biz Cast");
    record.description = Some("How venture capital shapes the AI startup world.".to_string());

    let digest = run(vec![record]);
    let categories = &digest.episodes[0].categories;
    assert_eq!(categories[0].name, "tech_startups");
    // "ai", "startup", and "venture capital" each score once, however often
    // they occur.
    assert_eq!(categories[0].score, 3);
}

#[test]
fn test_unmatched_episode_is_uncategorized() {
    let record = raw(Source::Spotify, "s1", "Ornithology Field Notes", "Bird Watch");
    let digest = run(vec![record]);

    assert!(digest.episodes[0].categories.is_empty());
    assert_eq!(digest.summary.uncategorized_count, 1);
}

#[test]
fn test_episode_can_hold_multiple_categories() {
    let mut record = raw(Source::Spotify, "s1", "Can AI Fix Your Sleep?", "Crossover");
    record.description = Some("Where the market meets longevity and nutrition.".to_string());

    let digest = run(vec![record]);
    let names: Vec<&str> = digest.episodes[0]
        .categories
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    assert!(names.contains(&"tech_startups"));
    assert!(names.contains(&"business_finance"));
    assert!(names.contains(&"health_longevity"));
}

#[test]
fn test_adding_text_never_removes_a_category() {
    let base = raw(Source::Spotify, "s1", "Startup Stories", "Biz Cast");
    let mut extended = raw(Source::Spotify, "s2", "Startup Stories", "Other Cast");
    extended.description = Some("Also touching on sleep and the stock market.".to_string());

    let digest = run(vec![base, extended]);
    let base_names: Vec<&str> = digest.episodes[0]
        .categories
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    let extended_names: Vec<&str> = digest.episodes[1]
        .categories
        .iter()
        .map(|m| m.name.as_str())
        .collect();

    for name in &base_names {
        assert!(extended_names.contains(name));
    }
    assert!(extended_names.len() > base_names.len());
}

// ---------------------------------------------------------------------------
// Degradation and configuration
// ---------------------------------------------------------------------------

#[test]
fn test_unparseable_fields_degrade_per_record() {
    let mut record = raw(Source::ListenNotes, "ln1", "Market Deep Dive", "Money Talk");
    record.published_at = Some("sometime last week".to_string());

    let digest = run(vec![record]);
    assert_eq!(digest.episodes.len(), 1);
    // Falls back to fetch time instead of dropping the record.
    assert_eq!(digest.episodes[0].episode.published_at, fetch_time());
}

#[test]
fn test_empty_input_produces_empty_digest() {
    let digest = run(Vec::new());
    assert!(digest.episodes.is_empty());
    assert_eq!(digest.summary.raw_count, 0);
}

#[test]
fn test_empty_category_table_is_rejected_up_front() {
    assert!(Pipeline::new(&[], DedupConfig::default()).is_err());
}

#[test]
fn test_malformed_category_is_rejected_up_front() {
    let bad = vec![Category::new("empty_patterns", &[])];
    assert!(Pipeline::new(&bad, DedupConfig::default()).is_err());
}

#[test]
fn test_custom_matcher_is_honored() {
    // A matcher that never matches: fuzzy merging is disabled entirely.
    struct NeverMatch;
    impl TitleMatcher for NeverMatch {
        fn similarity(&self, _a: &str, _b: &str) -> f64 {
            0.0
        }
    }

    let a = raw(
        Source::Spotify,
        "s1",
        "Interview with Dr Jane Smith on Sleep Science",
        "Health Hour",
    );
    let b = raw(
        Source::ListenNotes,
        "ln1",
        "Interview with Dr Jane Smith on Sleep Science Research",
        "Health Hour",
    );

    let pipeline = Pipeline::new(&test_categories(), DedupConfig::default())
        .expect("pipeline builds")
        .with_matcher(Box::new(NeverMatch));
    let digest = pipeline.run(&[a, b], fetch_time());
    assert_eq!(digest.summary.deduplicated_count, 2);
}

#[test]
fn test_source_counts_reported_per_source() {
    let records = vec![
        raw(Source::Spotify, "1", "A", "Show One"),
        raw(Source::Spotify, "2", "B", "Show Two"),
        raw(Source::ApplePodcasts, "3", "C", "Show Three"),
    ];

    let digest = run(records);
    assert_eq!(digest.summary.per_source.get(&Source::Spotify), Some(&2));
    assert_eq!(digest.summary.per_source.get(&Source::ApplePodcasts), Some(&1));
    assert_eq!(digest.summary.per_source.get(&Source::ListenNotes), None);
}
