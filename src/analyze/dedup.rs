//! Near-duplicate collapsing by title token overlap.
//!
//! - Titles are lowercased, punctuation is stripped, and the rest is split on
//!   whitespace into a token set.
//! - Articles are visited in input order; each is compared with every article
//!   already accepted using `|seen ∩ new| / |seen|` (asymmetric, measured
//!   against the earlier article).
//! - Overlap strictly above the threshold marks a duplicate; the first-seen
//!   article is the one kept.
//!
//! Quadratic in the number of accepted articles, which is fine for batches in
//! the hundreds.

use std::collections::HashSet;

use crate::ingest::types::Article;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Lowercase, strip punctuation, split on whitespace.
pub fn title_tokens(title: &str) -> HashSet<String> {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Share of `seen`'s tokens that also occur in `new`. An empty `seen` set
/// overlaps nothing.
pub fn overlap(seen: &HashSet<String>, new: &HashSet<String>) -> f64 {
    if seen.is_empty() {
        return 0.0;
    }
    let common = seen.intersection(new).count();
    common as f64 / seen.len() as f64
}

#[derive(Debug, Clone, Copy)]
pub struct Deduplicator {
    threshold: f64,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl Deduplicator {
    pub fn new(threshold: f64) -> Self {
        let threshold = if threshold.is_nan() {
            DEFAULT_SIMILARITY_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Keep the first of every near-duplicate group, in input order.
    /// Returns `(kept, dropped_count)`.
    pub fn dedup(&self, articles: Vec<Article>) -> (Vec<Article>, usize) {
        let mut seen: Vec<HashSet<String>> = Vec::with_capacity(articles.len());
        let mut kept: Vec<Article> = Vec::with_capacity(articles.len());
        let mut dropped = 0usize;

        for article in articles {
            let tokens = title_tokens(&article.title);

            // An empty title set cannot duplicate anything.
            if !tokens.is_empty() {
                if let Some(i) = seen
                    .iter()
                    .position(|prev| overlap(prev, &tokens) > self.threshold)
                {
                    tracing::debug!(
                        dropped = %article.title,
                        kept = %kept[i].title,
                        "near-duplicate collapsed"
                    );
                    dropped += 1;
                    continue;
                }
            }

            seen.push(tokens);
            kept.push(article);
        }

        (kept, dropped)
    }
}
