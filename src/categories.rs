//! Category configuration and compiled keyword matchers.
//!
//! Categories are static per run: loaded (or defaulted) once, compiled into
//! word-boundary regexes once, then evaluated by the pure categorizer. An
//! empty or malformed table is a fatal configuration error raised before any
//! processing starts.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{PodsiftError, Result};

fn default_weight() -> u32 {
    1
}

fn default_min_score() -> u32 {
    1
}

/// A keyword or phrase pattern with its score contribution per match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordPattern {
    pub pattern: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl KeywordPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            weight: 1,
        }
    }
}

/// A named topic with ordered keyword patterns and a qualifying threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub patterns: Vec<KeywordPattern>,
    /// Minimum total score for an episode to qualify. Default 1 — at least
    /// one keyword hit.
    #[serde(default = "default_min_score")]
    pub min_score: u32,
}

impl Category {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            patterns: keywords.iter().map(|k| KeywordPattern::new(*k)).collect(),
            min_score: 1,
        }
    }
}

/// A pattern compiled to a case-insensitive, word-boundary regex.
#[derive(Debug)]
pub struct CompiledPattern {
    pub regex: Regex,
    pub weight: u32,
}

/// A category with all patterns compiled.
#[derive(Debug)]
pub struct CompiledCategory {
    pub name: String,
    pub patterns: Vec<CompiledPattern>,
    pub min_score: u32,
}

/// The full compiled category table, in declaration order.
#[derive(Debug)]
pub struct CategorySet {
    categories: Vec<CompiledCategory>,
}

impl CategorySet {
    /// Compile a category table. Fails on an empty table, a category with no
    /// patterns, an empty pattern, a zero weight/threshold, or a pattern that
    /// does not compile as a regex literal.
    pub fn compile(categories: &[Category]) -> Result<Self> {
        if categories.is_empty() {
            return Err(PodsiftError::Config(
                "category configuration is empty".to_string(),
            ));
        }

        let mut compiled = Vec::with_capacity(categories.len());
        for category in categories {
            if category.name.trim().is_empty() {
                return Err(PodsiftError::Config("category with empty name".to_string()));
            }
            if category.patterns.is_empty() {
                return Err(PodsiftError::Config(format!(
                    "category '{}' has no patterns",
                    category.name
                )));
            }
            if category.min_score == 0 {
                return Err(PodsiftError::Config(format!(
                    "category '{}' has a zero minimum score",
                    category.name
                )));
            }

            let mut patterns = Vec::with_capacity(category.patterns.len());
            for kp in &category.patterns {
                if kp.pattern.trim().is_empty() {
                    return Err(PodsiftError::Config(format!(
                        "category '{}' has an empty pattern",
                        category.name
                    )));
                }
                if kp.weight == 0 {
                    return Err(PodsiftError::Config(format!(
                        "category '{}' pattern '{}' has zero weight",
                        category.name, kp.pattern
                    )));
                }
                // Patterns are literals; word boundaries keep "ai" from
                // matching inside "again".
                let source = format!(r"(?i)\b{}\b", regex::escape(kp.pattern.trim()));
                let regex = Regex::new(&source).map_err(|e| {
                    PodsiftError::Config(format!(
                        "category '{}' pattern '{}': {e}",
                        category.name, kp.pattern
                    ))
                })?;
                patterns.push(CompiledPattern {
                    regex,
                    weight: kp.weight,
                });
            }

            compiled.push(CompiledCategory {
                name: category.name.clone(),
                patterns,
                min_score: category.min_score,
            });
        }

        Ok(Self {
            categories: compiled,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledCategory> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Category names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }
}

/// The built-in topic table used when no `CATEGORIES_PATH` override is given.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(
            "tech_startups",
            &[
                "tech", "technology", "startup", "startups", "entrepreneur",
                "silicon valley", "software", "programming", "developer", "coding",
                "ai", "artificial intelligence", "machine learning", "data science",
                "venture capital", "vc", "saas", "product", "innovation",
                "disruption", "founder", "ceo", "cto", "engineering",
            ],
        ),
        Category::new(
            "business_finance",
            &[
                "business", "finance", "financial", "investing", "investment",
                "stocks", "market", "economy", "economics", "money", "wealth",
                "real estate", "crypto", "bitcoin", "banking", "strategy",
            ],
        ),
        Category::new(
            "news_current_events",
            &[
                "news", "politics", "election", "government", "policy", "world",
                "breaking", "current events", "journalism", "report", "analysis",
            ],
        ),
        Category::new(
            "philosophy",
            &[
                "philosophy", "philosophical", "ethics", "moral", "meaning",
                "existence", "consciousness", "wisdom", "stoic", "stoicism",
                "meditation", "mindfulness", "buddhism", "zen", "spiritual",
                "metaphysics", "epistemology",
            ],
        ),
        Category::new(
            "lifestyle_personal_growth",
            &[
                "lifestyle", "personal growth", "self-improvement", "self-help",
                "habits", "productivity", "motivation", "inspiration", "happiness",
                "relationships", "dating", "marriage", "parenting", "family",
                "minimalism", "creativity",
            ],
        ),
        Category::new(
            "career_development",
            &[
                "career", "job", "employment", "professional", "work", "workplace",
                "interview", "resume", "networking", "promotion", "salary",
                "negotiation", "remote work", "freelance", "side hustle", "skill",
                "learning",
            ],
        ),
        Category::new(
            "health_longevity",
            &[
                "health", "longevity", "aging", "anti-aging", "lifespan",
                "wellness", "nutrition", "diet", "fasting", "supplement",
                "biohacking", "medical", "doctor", "disease", "prevention",
                "immune", "gut health", "mental health",
            ],
        ),
        Category::new(
            "fitness_weight_training",
            &[
                "fitness", "weight training", "weightlifting", "strength",
                "muscle", "bodybuilding", "gym", "workout", "exercise", "lifting",
                "powerlifting", "crossfit", "running", "cardio", "sports",
                "athletic", "performance",
            ],
        ),
        Category::new(
            "sleep_management",
            &[
                "sleep", "insomnia", "rest", "recovery", "circadian", "melatonin",
                "dream", "nap", "fatigue", "energy", "tired", "bedtime",
            ],
        ),
    ]
}
