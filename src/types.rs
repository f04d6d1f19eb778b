//! Run configuration loaded from environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::categories::{default_categories, Category};
use crate::errors::{PodsiftError, Result};
use crate::pipeline::dedup::DedupConfig;

fn validate_similarity_threshold(threshold: f64) -> std::result::Result<(), validator::ValidationError> {
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(validator::ValidationError::new(
            "similarity_threshold must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_window_hours(hours: i64) -> std::result::Result<(), validator::ValidationError> {
    if hours <= 0 {
        return Err(validator::ValidationError::new(
            "dedup_window_hours must be > 0",
        ));
    }
    Ok(())
}

/// Central configuration loaded from environment variables.
///
/// All credentials are optional: an unconfigured source is skipped by its
/// collector rather than failing the run.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DigestConfig {
    /// Podcast Index API key (`PODCAST_INDEX_API_KEY`).
    pub podcast_index_api_key: Option<String>,

    /// Podcast Index API secret (`PODCAST_INDEX_API_SECRET`).
    pub podcast_index_api_secret: Option<String>,

    /// Spotify client id (`SPOTIFY_CLIENT_ID`).
    pub spotify_client_id: Option<String>,

    /// Spotify client secret (`SPOTIFY_CLIENT_SECRET`).
    pub spotify_client_secret: Option<String>,

    /// Resend API key for email delivery (`RESEND_API_KEY`).
    pub resend_api_key: Option<String>,

    /// Digest recipient address (`DIGEST_EMAIL`).
    pub digest_email: Option<String>,

    /// How many days back collectors should look (`DAYS_TO_LOOK_BACK`).
    pub days_to_look_back: u32,

    /// Per-source episode cap (`MAX_EPISODES_PER_SOURCE`).
    pub max_episodes_per_source: usize,

    /// Per-category cap in the rendered digest (`MAX_EPISODES_PER_CATEGORY`).
    pub max_episodes_per_category: usize,

    /// Fuzzy-match similarity cutoff (`DEDUP_SIMILARITY_THRESHOLD`, must be in (0, 1]).
    #[validate(custom(function = "validate_similarity_threshold"))]
    pub similarity_threshold: f64,

    /// Fuzzy-match publish-time window in hours (`DEDUP_WINDOW_HOURS`, must be > 0).
    #[validate(custom(function = "validate_window_hours"))]
    pub dedup_window_hours: i64,

    /// Optional JSON category table overriding the built-in defaults
    /// (`CATEGORIES_PATH`).
    pub categories_path: Option<PathBuf>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            podcast_index_api_key: None,
            podcast_index_api_secret: None,
            spotify_client_id: None,
            spotify_client_secret: None,
            resend_api_key: None,
            digest_email: None,
            days_to_look_back: 3,
            max_episodes_per_source: 50,
            max_episodes_per_category: 10,
            similarity_threshold: 0.85,
            dedup_window_hours: 48,
            categories_path: None,
        }
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parsed_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|_| PodsiftError::Config(format!("{name} must be a valid number"))),
        Err(_) => Ok(default),
    }
}

impl DigestConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` first (non-fatal if `.env` is absent),
    /// then reads each variable from the process environment. Numeric
    /// variables fall back to their defaults when unset and return a
    /// [`PodsiftError::Config`] when set but unparsable or out of range.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            podcast_index_api_key: optional_env("PODCAST_INDEX_API_KEY"),
            podcast_index_api_secret: optional_env("PODCAST_INDEX_API_SECRET"),
            spotify_client_id: optional_env("SPOTIFY_CLIENT_ID"),
            spotify_client_secret: optional_env("SPOTIFY_CLIENT_SECRET"),
            resend_api_key: optional_env("RESEND_API_KEY"),
            digest_email: optional_env("DIGEST_EMAIL"),
            days_to_look_back: parsed_env("DAYS_TO_LOOK_BACK", defaults.days_to_look_back)?,
            max_episodes_per_source: parsed_env(
                "MAX_EPISODES_PER_SOURCE",
                defaults.max_episodes_per_source,
            )?,
            max_episodes_per_category: parsed_env(
                "MAX_EPISODES_PER_CATEGORY",
                defaults.max_episodes_per_category,
            )?,
            similarity_threshold: parsed_env(
                "DEDUP_SIMILARITY_THRESHOLD",
                defaults.similarity_threshold,
            )?,
            dedup_window_hours: parsed_env("DEDUP_WINDOW_HOURS", defaults.dedup_window_hours)?,
            categories_path: optional_env("CATEGORIES_PATH").map(PathBuf::from),
        };

        config
            .validate()
            .map_err(|e| PodsiftError::Config(e.to_string()))?;

        Ok(config)
    }

    pub fn has_podcast_index(&self) -> bool {
        self.podcast_index_api_key.is_some() && self.podcast_index_api_secret.is_some()
    }

    pub fn has_spotify(&self) -> bool {
        self.spotify_client_id.is_some() && self.spotify_client_secret.is_some()
    }

    pub fn has_resend(&self) -> bool {
        self.resend_api_key.is_some() && self.digest_email.is_some()
    }

    /// Deduplication thresholds for this run.
    pub fn dedup_config(&self) -> DedupConfig {
        DedupConfig {
            similarity_threshold: self.similarity_threshold,
            time_window: chrono::Duration::hours(self.dedup_window_hours),
        }
    }

    /// Load the category table: the JSON file at `categories_path` when set,
    /// otherwise the built-in defaults.
    pub fn load_categories(&self) -> Result<Vec<Category>> {
        match &self.categories_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    PodsiftError::Config(format!(
                        "cannot read category table {}: {e}",
                        path.display()
                    ))
                })?;
                let categories: Vec<Category> = serde_json::from_str(&raw).map_err(|e| {
                    PodsiftError::Config(format!(
                        "invalid category table {}: {e}",
                        path.display()
                    ))
                })?;
                Ok(categories)
            }
            None => Ok(default_categories()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, MutexGuard};

    // Serializes tests that mutate the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_guard() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Temporarily sets env vars for a test, restoring originals afterward.
    fn with_env<F, R>(vars: &[(&str, &str)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = env_guard();

        // Save originals.
        let originals: Vec<(&str, Option<String>)> =
            vars.iter().map(|(k, _)| (*k, env::var(k).ok())).collect();

        // Set test values.
        for (k, v) in vars {
            env::set_var(k, v);
        }

        let result = f();

        // Restore originals.
        for (k, original) in &originals {
            match original {
                Some(v) => env::set_var(k, v),
                None => env::remove_var(k),
            }
        }

        result
    }

    const NUMERIC_VARS: &[&str] = &[
        "DAYS_TO_LOOK_BACK",
        "MAX_EPISODES_PER_SOURCE",
        "MAX_EPISODES_PER_CATEGORY",
        "DEDUP_SIMILARITY_THRESHOLD",
        "DEDUP_WINDOW_HOURS",
    ];

    #[test]
    fn test_config_defaults() {
        let _guard = env_guard();
        for var in NUMERIC_VARS {
            env::remove_var(var);
        }
        let config = DigestConfig::from_env().expect("config should load");
        assert_eq!(config.days_to_look_back, 3);
        assert_eq!(config.max_episodes_per_source, 50);
        assert_eq!(config.max_episodes_per_category, 10);
        assert_eq!(config.similarity_threshold, 0.85);
        assert_eq!(config.dedup_window_hours, 48);
    }

    #[test]
    fn test_config_custom_values() {
        with_env(
            &[
                ("DEDUP_SIMILARITY_THRESHOLD", "0.9"),
                ("DEDUP_WINDOW_HOURS", "24"),
                ("MAX_EPISODES_PER_SOURCE", "25"),
            ],
            || {
                let config = DigestConfig::from_env().expect("config should load");
                assert_eq!(config.similarity_threshold, 0.9);
                assert_eq!(config.dedup_window_hours, 24);
                assert_eq!(config.max_episodes_per_source, 25);
            },
        );
    }

    #[test]
    fn test_config_invalid_threshold() {
        with_env(&[("DEDUP_SIMILARITY_THRESHOLD", "1.5")], || {
            let result = DigestConfig::from_env();
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_config_unparsable_number() {
        with_env(&[("DEDUP_WINDOW_HOURS", "two days")], || {
            match DigestConfig::from_env() {
                Err(PodsiftError::Config(msg)) => assert!(msg.contains("DEDUP_WINDOW_HOURS")),
                other => panic!("expected Config error, got {other:?}"),
            }
        });
    }

    #[test]
    fn test_config_zero_window_rejected() {
        with_env(&[("DEDUP_WINDOW_HOURS", "0")], || {
            assert!(DigestConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_has_accessors() {
        let mut config = DigestConfig::default();
        assert!(!config.has_podcast_index());
        assert!(!config.has_spotify());
        assert!(!config.has_resend());

        config.podcast_index_api_key = Some("key".to_string());
        assert!(!config.has_podcast_index());
        config.podcast_index_api_secret = Some("secret".to_string());
        assert!(config.has_podcast_index());

        config.resend_api_key = Some("re_123".to_string());
        assert!(!config.has_resend());
        config.digest_email = Some("me@example.com".to_string());
        assert!(config.has_resend());
    }

    #[test]
    fn test_load_default_categories() {
        let config = DigestConfig::default();
        let categories = config.load_categories().expect("defaults load");
        assert!(!categories.is_empty());
    }

    #[test]
    fn test_load_categories_missing_file() {
        let config = DigestConfig {
            categories_path: Some(PathBuf::from("/nonexistent/categories.json")),
            ..DigestConfig::default()
        };
        assert!(matches!(
            config.load_categories(),
            Err(PodsiftError::Config(_))
        ));
    }
}
