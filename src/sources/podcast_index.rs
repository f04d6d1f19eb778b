//! Podcast Index collector (podcastindex.org).
//!
//! Auth scheme: every request carries `X-Auth-Date` (epoch seconds),
//! `X-Auth-Key`, and an `Authorization` header holding the hex SHA-1 of
//! `key + secret + epoch`.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::debug;

use crate::episodes::{RawRecord, Source};
use crate::errors::CollectorError;
use crate::types::DigestConfig;

use super::{retry_policy, EpisodeCollector, USER_AGENT};

const BASE_URL: &str = "https://api.podcastindex.org/api/1.0";

/// Trending feeds scanned per run.
const TRENDING_FEEDS: usize = 10;
/// Recent episodes kept per feed.
const EPISODES_PER_FEED: usize = 3;

pub struct PodcastIndexCollector {
    client: reqwest::Client,
    api_key: Option<String>,
    api_secret: Option<String>,
    lookback_days: u32,
}

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    feeds: Vec<TrendingFeed>,
}

#[derive(Debug, Deserialize)]
struct TrendingFeed {
    id: u64,
    title: String,
    #[serde(default)]
    author: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EpisodesResponse {
    #[serde(default)]
    items: Vec<FeedEpisode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedEpisode {
    id: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    date_published: Option<i64>,
    #[serde(default)]
    duration: Option<u32>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    enclosure_url: Option<String>,
}

impl PodcastIndexCollector {
    pub fn new(config: &DigestConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.podcast_index_api_key.clone(),
            api_secret: config.podcast_index_api_secret.clone(),
            lookback_days: config.days_to_look_back,
        }
    }

    fn credentials(&self) -> Result<(&str, &str), CollectorError> {
        match (self.api_key.as_deref(), self.api_secret.as_deref()) {
            (Some(key), Some(secret)) => Ok((key, secret)),
            _ => Err(CollectorError::NotConfigured),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, CollectorError> {
        let (key, secret) = self.credentials()?;
        let url = format!("{BASE_URL}/{path}");

        let response = backoff::future::retry(retry_policy(), || async {
            // Auth headers are time-based, so they are rebuilt per attempt.
            let epoch = Utc::now().timestamp();
            let mut hasher = Sha1::new();
            hasher.update(key.as_bytes());
            hasher.update(secret.as_bytes());
            hasher.update(epoch.to_string().as_bytes());
            let auth = hex::encode(hasher.finalize());

            let result = self
                .client
                .get(&url)
                .query(params)
                .header("X-Auth-Date", epoch.to_string())
                .header("X-Auth-Key", key)
                .header("Authorization", auth)
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

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl EpisodeCollector for PodcastIndexCollector {
    fn source(&self) -> Source {
        Source::PodcastIndex
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.api_secret.is_some()
    }

    async fn collect(&self, max_episodes: usize) -> Result<Vec<RawRecord>, CollectorError> {
        let trending: TrendingResponse = self
            .get_json("podcasts/trending", &[("max", "20".to_string())])
            .await?;

        let since = (Utc::now() - chrono::Duration::days(self.lookback_days as i64)).timestamp();
        let mut records = Vec::new();

        for feed in trending.feeds.into_iter().take(TRENDING_FEEDS) {
            if records.len() >= max_episodes {
                break;
            }
            let episodes: EpisodesResponse = match self
                .get_json(
                    "episodes/byfeed",
                    &[
                        ("id", feed.id.to_string()),
                        ("max", "10".to_string()),
                        ("since", since.to_string()),
                    ],
                )
                .await
            {
                Ok(episodes) => episodes,
                Err(e) => {
                    debug!(feed = feed.id, error = %e, "skipping feed");
                    continue;
                }
            };

            for episode in episodes.items.into_iter().take(EPISODES_PER_FEED) {
                records.push(RawRecord {
                    source: Source::PodcastIndex,
                    external_id: episode.id.to_string(),
                    title: episode.title,
                    show_title: feed.title.clone(),
                    author: feed.author.clone(),
                    description: episode.description,
                    published_at: episode.date_published.map(|ts| ts.to_string()),
                    duration_seconds: episode.duration,
                    episode_url: episode.link,
                    audio_url: episode.enclosure_url,
                });
            }
        }

        records.truncate(max_episodes);
        Ok(records)
    }
}
