//! Listen Notes collector.
//!
//! No official API credentials: scrapes the public best-podcasts pages. The
//! markup is outside our control, so every selector miss degrades to fewer
//! records rather than an error.

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;

use crate::episodes::{RawRecord, Source};
use crate::errors::CollectorError;
use crate::types::DigestConfig;

use super::{retry_policy, EpisodeCollector, USER_AGENT};

const BASE_URL: &str = "https://www.listennotes.com";

/// Best-podcasts pages scanned per run.
const CATEGORY_PAGES: &[(&str, &str)] = &[
    ("technology", "/best-technology-podcasts"),
    ("business", "/best-business-podcasts"),
    ("news", "/best-news-podcasts"),
    ("health", "/best-health-fitness-podcasts"),
    ("education", "/best-education-podcasts"),
    ("society", "/best-society-culture-podcasts"),
    ("science", "/best-science-podcasts"),
];

pub struct ListenNotesCollector {
    client: reqwest::Client,
}

impl ListenNotesCollector {
    pub fn new(_config: &DigestConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn get_page(&self, path: &str) -> Result<String, CollectorError> {
        let url = format!("{BASE_URL}{path}");
        let response = backoff::future::retry(retry_policy(), || async {
            let result = self
                .client
                .get(&url)
                .header("User-Agent", USER_AGENT)
                .header("Accept", "text/html")
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

    /// Pull episode cards out of a best-podcasts page.
    ///
    /// Each card links to an episode page (`/e/<id>/`) and names both the
    /// episode and its show; cards missing either are skipped.
    fn parse_page(html: &str) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        let card = Selector::parse("a[href^='/e/']").expect("static selector is valid");
        let title_sel = Selector::parse(".episode-title, h3").expect("static selector is valid");
        let show_sel = Selector::parse(".podcast-title, h4").expect("static selector is valid");
        let desc_sel = Selector::parse("p").expect("static selector is valid");

        let mut records = Vec::new();
        for element in document.select(&card) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let external_id = href.trim_matches('/').trim_start_matches("e/").to_string();
            if external_id.is_empty() {
                continue;
            }

            let text_of = |selector: &Selector| {
                element
                    .select(selector)
                    .next()
                    .map(|n| n.text().collect::<String>().trim().to_string())
                    .filter(|s| !s.is_empty())
            };

            let title = text_of(&title_sel)
                .or_else(|| element.value().attr("title").map(str::to_string));
            let Some(title) = title else {
                continue;
            };
            let Some(show_title) = text_of(&show_sel) else {
                continue;
            };

            records.push(RawRecord {
                source: Source::ListenNotes,
                external_id,
                title,
                show_title,
                author: None,
                description: text_of(&desc_sel),
                published_at: None,
                duration_seconds: None,
                episode_url: Some(format!("{BASE_URL}{href}")),
                audio_url: None,
            });
        }
        records
    }
}

#[async_trait]
impl EpisodeCollector for ListenNotesCollector {
    fn source(&self) -> Source {
        Source::ListenNotes
    }

    fn is_configured(&self) -> bool {
        // Public pages, no credentials.
        true
    }

    async fn collect(&self, max_episodes: usize) -> Result<Vec<RawRecord>, CollectorError> {
        let mut records = Vec::new();

        for (category, path) in CATEGORY_PAGES {
            if records.len() >= max_episodes {
                break;
            }
            match self.get_page(path).await {
                Ok(html) => records.extend(Self::parse_page(&html)),
                Err(e) => {
                    debug!(category, error = %e, "skipping category page");
                }
            }
        }

        records.truncate(max_episodes);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_configured() {
        let collector = ListenNotesCollector::new(&DigestConfig::default());
        assert!(collector.is_configured());
        assert_eq!(collector.source(), Source::ListenNotes);
    }

    #[test]
    fn test_parse_page_extracts_cards() {
        let html = r#"
            <html><body>
              <a href="/e/abc123/">
                <h3>Deep Work Revisited</h3>
                <h4>Productivity Hour</h4>
                <p>A conversation about focus.</p>
              </a>
              <a href="/e/def456/">
                <h3>Markets This Week</h3>
                <h4>Money Talk</h4>
              </a>
              <a href="/podcasts/some-show">ignored, not an episode</a>
            </body></html>
        "#;

        let records = ListenNotesCollector::parse_page(html);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].external_id, "abc123");
        assert_eq!(records[0].title, "Deep Work Revisited");
        assert_eq!(records[0].show_title, "Productivity Hour");
        assert_eq!(
            records[0].description.as_deref(),
            Some("A conversation about focus.")
        );
        assert_eq!(records[1].external_id, "def456");
        assert!(records[1].description.is_none());
    }

    #[test]
    fn test_parse_page_skips_incomplete_cards() {
        let html = r#"<a href="/e/only-title/"><h3>Just a title</h3></a>"#;
        let records = ListenNotesCollector::parse_page(html);
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_empty_page() {
        assert!(ListenNotesCollector::parse_page("<html></html>").is_empty());
    }
}
