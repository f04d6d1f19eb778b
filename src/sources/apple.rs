//! Apple Podcasts collector.
//!
//! No credentials needed: reads the public iTunes top-podcasts charts per
//! genre, resolves each chart entry's RSS feed via the lookup API, and pulls
//! the newest items from the feed itself.

use async_trait::async_trait;
use rss::Channel;
use serde::Deserialize;
use tracing::debug;

use crate::episodes::{RawRecord, Source};
use crate::errors::CollectorError;
use crate::types::DigestConfig;
use crate::utils::datetime::parse_duration_hms;

use super::{retry_policy, EpisodeCollector, USER_AGENT};

const LOOKUP_API: &str = "https://itunes.apple.com/lookup";

/// (genre name, iTunes genre id) pairs scanned per run.
const GENRES: &[(&str, u32)] = &[
    ("technology", 1318),
    ("business", 1321),
    ("news", 1489),
    ("health_fitness", 1512),
    ("society_culture", 1324),
    ("education", 1304),
    ("science", 1533),
];

/// Chart entries fetched per genre.
const CHART_LIMIT: usize = 10;
/// Newest items kept per feed.
const EPISODES_PER_FEED: usize = 2;

pub struct ApplePodcastsCollector {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    feed: ChartFeed,
}

#[derive(Debug, Deserialize)]
struct ChartFeed {
    #[serde(default)]
    entry: Vec<ChartEntry>,
}

#[derive(Debug, Deserialize)]
struct ChartEntry {
    id: ChartEntryId,
}

#[derive(Debug, Deserialize)]
struct ChartEntryId {
    attributes: ChartEntryIdAttributes,
}

#[derive(Debug, Deserialize)]
struct ChartEntryIdAttributes {
    #[serde(rename = "im:id")]
    im_id: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResult {
    #[serde(default)]
    feed_url: Option<String>,
    #[serde(default)]
    collection_name: Option<String>,
    #[serde(default)]
    artist_name: Option<String>,
}

impl ApplePodcastsCollector {
    pub fn new(_config: &DigestConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn get_text(&self, url: &str) -> Result<String, CollectorError> {
        let response = backoff::future::retry(retry_policy(), || async {
            let result = self
                .client
                .get(url)
                .header("User-Agent", USER_AGENT)
                .send()
                .await
                .and_then(|r| r.error_for_status());

            match result {
                Ok(response) => Ok(response),
                Err(e) if e.is_status() && e.status().map_or(false, |s| s.is_client_error()) => {
                    Err(backoff::Error::permanent(e))
                }
                Err(e) => Err(backoff::Error::transient(e)),
            }
        })
        .await?;

        Ok(response.text().await?)
    }

    async fn chart_podcast_ids(&self, genre_id: u32) -> Result<Vec<String>, CollectorError> {
        let url = format!(
            "https://itunes.apple.com/us/rss/toppodcasts/limit={CHART_LIMIT}/genre={genre_id}/json"
        );
        let body = self.get_text(&url).await?;
        let chart: ChartResponse = serde_json::from_str(&body)
            .map_err(|e| CollectorError::Parse(format!("chart for genre {genre_id}: {e}")))?;
        Ok(chart
            .feed
            .entry
            .into_iter()
            .map(|entry| entry.id.attributes.im_id)
            .collect())
    }

    async fn lookup(&self, podcast_id: &str) -> Result<Option<LookupResult>, CollectorError> {
        let url = format!("{LOOKUP_API}?id={podcast_id}");
        let body = self.get_text(&url).await?;
        let lookup: LookupResponse = serde_json::from_str(&body)
            .map_err(|e| CollectorError::Parse(format!("lookup {podcast_id}: {e}")))?;
        Ok(lookup.results.into_iter().next())
    }

    fn feed_records(channel: &Channel, show: &LookupResult) -> Vec<RawRecord> {
        let show_title = show
            .collection_name
            .clone()
            .unwrap_or_else(|| channel.title().to_string());

        channel
            .items()
            .iter()
            .take(EPISODES_PER_FEED)
            .filter_map(|item| {
                let title = item.title()?.to_string();
                let audio_url = item.enclosure().map(|e| e.url().to_string());
                let external_id = item
                    .guid()
                    .map(|g| g.value().to_string())
                    .or_else(|| item.link().map(str::to_string))
                    .or_else(|| audio_url.clone())?;

                Some(RawRecord {
                    source: Source::ApplePodcasts,
                    external_id,
                    title,
                    show_title: show_title.clone(),
                    author: show.artist_name.clone(),
                    description: item.description().map(str::to_string),
                    published_at: item.pub_date().map(str::to_string),
                    duration_seconds: item
                        .itunes_ext()
                        .and_then(|ext| ext.duration())
                        .and_then(parse_duration_hms),
                    episode_url: item.link().map(str::to_string),
                    audio_url,
                })
            })
            .collect()
    }
}

#[async_trait]
impl EpisodeCollector for ApplePodcastsCollector {
    fn source(&self) -> Source {
        Source::ApplePodcasts
    }

    fn is_configured(&self) -> bool {
        // Public charts, no credentials.
        true
    }

    async fn collect(&self, max_episodes: usize) -> Result<Vec<RawRecord>, CollectorError> {
        let mut records = Vec::new();
        let mut seen_podcast_ids = std::collections::HashSet::new();

        'genres: for (genre_name, genre_id) in GENRES {
            let podcast_ids = match self.chart_podcast_ids(*genre_id).await {
                Ok(ids) => ids,
                Err(e) => {
                    debug!(genre = genre_name, error = %e, "skipping genre chart");
                    continue;
                }
            };

            for podcast_id in podcast_ids {
                if records.len() >= max_episodes {
                    break 'genres;
                }
                if !seen_podcast_ids.insert(podcast_id.clone()) {
                    continue;
                }

                let show = match self.lookup(&podcast_id).await {
                    Ok(Some(show)) => show,
                    Ok(None) => continue,
                    Err(e) => {
                        debug!(podcast = %podcast_id, error = %e, "lookup failed");
                        continue;
                    }
                };
                let Some(feed_url) = show.feed_url.clone() else {
                    continue;
                };

                let feed_xml = match self.get_text(&feed_url).await {
                    Ok(xml) => xml,
                    Err(e) => {
                        debug!(feed = %feed_url, error = %e, "feed fetch failed");
                        continue;
                    }
                };
                let channel = match feed_xml.parse::<Channel>() {
                    Ok(channel) => channel,
                    Err(e) => {
                        debug!(feed = %feed_url, error = %e, "feed parse failed");
                        continue;
                    }
                };

                records.extend(Self::feed_records(&channel, &show));
            }
        }

        records.truncate(max_episodes);
        Ok(records)
    }
}
