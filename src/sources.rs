//! # Feed Source Registry
//!
//! Static catalog of named news sources. Each source carries a credibility
//! weight (`0..=10`) and a topic category used by the scorer.
//!
//! - Loaded once at startup (TOML/JSON, see `ingest::config`) or from the
//!   built-in `default_seed()`.
//! - Names are unique (case-insensitive); the first occurrence wins.
//! - Descriptors are shared as `Arc<SourceDescriptor>` and never mutated.
//! - Registry order is the deterministic merge order for everything downstream.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// Highest credibility a source may carry.
pub const MAX_CREDIBILITY: u8 = 10;

/// Immutable config entry for one feed source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    #[serde(default)]
    pub credibility: u8,
    #[serde(default = "default_category")]
    pub category: String,
    /// Where the fetcher reads entries from. The scoring core ignores it.
    #[serde(default, alias = "url")]
    pub feed_url: Option<String>,
}

fn default_category() -> String {
    "General Health".to_string()
}

impl SourceDescriptor {
    pub fn new(name: &str, credibility: u8, category: &str) -> Self {
        Self {
            name: name.to_string(),
            credibility: credibility.min(MAX_CREDIBILITY),
            category: category.to_string(),
            feed_url: None,
        }
    }

    pub fn with_feed_url(mut self, url: &str) -> Self {
        self.feed_url = Some(url.to_string());
        self
    }
}

/// Ordered, validated set of sources.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<SourceDescriptor>>,
}

impl SourceRegistry {
    /// Build a registry from raw descriptors.
    ///
    /// Trims names, drops blank ones, clamps credibility and keeps only the
    /// first of any case-insensitive duplicate names.
    pub fn from_descriptors(items: Vec<SourceDescriptor>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut sources = Vec::with_capacity(items.len());

        for mut d in items {
            d.name = d.name.trim().to_string();
            if d.name.is_empty() {
                continue;
            }
            if !seen.insert(d.name.to_lowercase()) {
                warn!(source = %d.name, "duplicate source name ignored");
                continue;
            }
            d.credibility = d.credibility.min(MAX_CREDIBILITY);
            d.category = d.category.trim().to_string();
            d.feed_url = d
                .feed_url
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty());
            sources.push(Arc::new(d));
        }

        Self { sources }
    }

    /// Case-insensitive lookup by name.
    pub fn get(&self, name: &str) -> Option<&Arc<SourceDescriptor>> {
        let needle = name.trim();
        self.sources
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(needle))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SourceDescriptor>> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Built-in catalog of health news feeds.
    /// Used when no sources file is configured.
    pub fn default_seed() -> Self {
        let seed = [
            (
                "NIH News Releases",
                10,
                "Medical Research",
                "https://www.nih.gov/news-releases/feed.xml",
            ),
            (
                "CDC Newsroom",
                10,
                "Public Health",
                "https://tools.cdc.gov/api/v2/resources/media/132608.rss",
            ),
            (
                "WHO News",
                10,
                "Public Health",
                "https://www.who.int/rss-feeds/news-english.xml",
            ),
            (
                "National Cancer Institute",
                10,
                "Oncology",
                "https://www.cancer.gov/syndication/rss",
            ),
            (
                "Harvard Health Blog",
                9,
                "Wellness",
                "https://www.health.harvard.edu/blog/feed",
            ),
            (
                "American Heart Association News",
                9,
                "Heart Health",
                "https://www.heart.org/en/news/rss",
            ),
            (
                "ScienceDaily Health",
                8,
                "Medical Research",
                "https://www.sciencedaily.com/rss/health_medicine.xml",
            ),
            (
                "STAT News",
                8,
                "Medical Research",
                "https://www.statnews.com/feed/",
            ),
            (
                "NPR Health",
                8,
                "General Health",
                "https://feeds.npr.org/1128/rss.xml",
            ),
            (
                "BBC Health",
                8,
                "General Health",
                "https://feeds.bbci.co.uk/news/health/rss.xml",
            ),
            (
                "Medical News Today",
                7,
                "General Health",
                "https://www.medicalnewstoday.com/rss",
            ),
            (
                "Psychology Today",
                6,
                "Mental Health",
                "https://www.psychologytoday.com/us/front/feed",
            ),
            (
                "Healthline Nutrition",
                6,
                "Nutrition",
                "https://www.healthline.com/rss/nutrition",
            ),
            (
                "Men's Health",
                5,
                "Fitness",
                "https://www.menshealth.com/rss/all.xml/",
            ),
        ];

        Self::from_descriptors(
            seed.into_iter()
                .map(|(name, cred, cat, url)| SourceDescriptor::new(name, cred, cat).with_feed_url(url))
                .collect(),
        )
    }
}
