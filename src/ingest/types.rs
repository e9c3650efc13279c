// src/ingest/types.rs
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::sources::SourceDescriptor;

/// Untyped field mapping as delivered by a feed provider.
/// Blank values are treated as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawEntry {
    fields: BTreeMap<String, String>,
}

impl RawEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Non-blank value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// First non-blank value among `keys`, in order.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.get(k))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawEntry {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Canonical news item. Immutable once built; scoring wraps it instead of
/// mutating it (see `analyze::scoring::ScoredArticle`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub summary: String,
    /// Unix seconds; `None` means unknown recency.
    pub published_at: Option<i64>,
    pub source: Arc<SourceDescriptor>,
}

impl Article {
    /// `title + " " + summary`, the text every keyword trigger runs against.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }

    /// Age in seconds relative to `now`; negative ages (clock skew) read as 0.
    pub fn age_secs(&self, now: i64) -> Option<i64> {
        self.published_at.map(|ts| now.saturating_sub(ts).max(0))
    }
}

#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>>;
    fn source(&self) -> &Arc<SourceDescriptor>;
}
