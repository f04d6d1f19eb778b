//! Spotify collector.
//!
//! Uses the client-credentials OAuth flow, searches shows for a fixed set of
//! topic queries, and pulls the newest episodes per show.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::episodes::{RawRecord, Source};
use crate::errors::CollectorError;
use crate::types::DigestConfig;

use super::{retry_policy, EpisodeCollector, USER_AGENT};

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

/// Show-search queries issued per run.
const SEARCH_QUERIES: &[&str] = &[
    "technology",
    "business",
    "news",
    "health",
    "philosophy",
    "fitness",
];

/// Shows kept per search query.
const SHOWS_PER_QUERY: usize = 5;
/// Newest episodes kept per show.
const EPISODES_PER_SHOW: usize = 3;

pub struct SpotifyCollector {
    client: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    shows: ShowPage,
}

#[derive(Debug, Deserialize)]
struct ShowPage {
    #[serde(default)]
    items: Vec<Show>,
}

#[derive(Debug, Deserialize)]
struct Show {
    id: String,
    name: String,
    #[serde(default)]
    publisher: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EpisodePage {
    #[serde(default)]
    items: Vec<ShowEpisode>,
}

#[derive(Debug, Deserialize)]
struct ShowEpisode {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    duration_ms: Option<u64>,
    #[serde(default)]
    external_urls: ExternalUrls,
    #[serde(default)]
    audio_preview_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    #[serde(default)]
    spotify: Option<String>,
}

impl SpotifyCollector {
    pub fn new(config: &DigestConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
        }
    }

    async fn access_token(&self) -> Result<String, CollectorError> {
        let (id, secret) = match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) => (id, secret),
            _ => return Err(CollectorError::NotConfigured),
        };

        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(id, Some(secret))
            .header("User-Agent", USER_AGENT)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CollectorError::Auth(format!(
                "token request returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        token: &str,
        url: &str,
    ) -> Result<T, CollectorError> {
        let response = backoff::future::retry(retry_policy(), || async {
            let result = self
                .client
                .get(url)
                .bearer_auth(token)
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
impl EpisodeCollector for SpotifyCollector {
    fn source(&self) -> Source {
        Source::Spotify
    }

    fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    async fn collect(&self, max_episodes: usize) -> Result<Vec<RawRecord>, CollectorError> {
        let token = self.access_token().await?;
        let mut records = Vec::new();
        let mut seen_show_ids = std::collections::HashSet::new();

        'queries: for query in SEARCH_QUERIES {
            let url = format!(
                "{API_BASE}/search?q={query}&type=show&market=US&limit={SHOWS_PER_QUERY}"
            );
            let search: SearchResponse = match self.get_json(&token, &url).await {
                Ok(search) => search,
                Err(e) => {
                    debug!(query, error = %e, "show search failed");
                    continue;
                }
            };

            for show in search.shows.items {
                if records.len() >= max_episodes {
                    break 'queries;
                }
                if !seen_show_ids.insert(show.id.clone()) {
                    continue;
                }

                let url = format!(
                    "{API_BASE}/shows/{}/episodes?market=US&limit={EPISODES_PER_SHOW}",
                    show.id
                );
                let episodes: EpisodePage = match self.get_json(&token, &url).await {
                    Ok(episodes) => episodes,
                    Err(e) => {
                        debug!(show = %show.id, error = %e, "episode fetch failed");
                        continue;
                    }
                };

                for episode in episodes.items {
                    records.push(RawRecord {
                        source: Source::Spotify,
                        external_id: episode.id,
                        title: episode.name,
                        show_title: show.name.clone(),
                        author: show.publisher.clone(),
                        description: episode.description,
                        published_at: episode.release_date,
                        duration_seconds: episode
                            .duration_ms
                            .map(|ms| (ms / 1000) as u32),
                        episode_url: episode.external_urls.spotify,
                        audio_url: episode.audio_preview_url,
                    });
                }
            }
        }

        records.truncate(max_episodes);
        Ok(records)
    }
}
