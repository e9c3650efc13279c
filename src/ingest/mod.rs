// src/ingest/mod.rs
//! Article normalizer and the provider boundary.
//!
//! Raw entries come in as `(SourceDescriptor, RawEntry)` pairs in registry
//! order. Entries without a title or URL are routine and silently skipped;
//! an unparseable timestamp just means "unknown recency".

pub mod config;
pub mod providers;
pub mod types;

use crate::ingest::types::{Article, FeedProvider, RawEntry};
use crate::sources::SourceDescriptor;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use time::{
    format_description::well_known::{Rfc2822, Rfc3339},
    macros::format_description,
    Date, OffsetDateTime,
};

pub const TITLE_KEYS: &[&str] = &["title"];
pub const URL_KEYS: &[&str] = &["link", "url"];
pub const SUMMARY_KEYS: &[&str] = &["summary", "description"];
pub const PUBLISHED_KEYS: &[&str] = &["published", "pubDate", "updated"];

const MAX_TEXT_CHARS: usize = 1500;

/// One-time metrics registration (so series show up in the exported snapshot).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_entries_total", "Raw entries returned by providers.");
        describe_counter!(
            "ingest_rejected_total",
            "Entries dropped for a missing title or URL."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_counter!(
            "dedup_dropped_total",
            "Articles collapsed as near-duplicates."
        );
        describe_counter!("articles_scored_total", "Articles passed through the scorer.");
        describe_histogram!("ingest_parse_ms", "Provider parse time in milliseconds.");
        describe_histogram!("viral_score", "Distribution of assigned viral scores.");
        describe_gauge!("pipeline_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

/// Normalize feed text: decode entities, strip tags, fold quotes, collapse whitespace.
/// Trailing `?`/`!` are kept; the scorer looks at them.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap
    if out.chars().count() > MAX_TEXT_CHARS {
        out = out.chars().take(MAX_TEXT_CHARS).collect();
    }

    out
}

/// Parse a feed timestamp into unix seconds.
/// Accepts RFC 2822, RFC 3339 and bare `YYYY-MM-DD`; anything else is `None`.
pub fn parse_published(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc2822) {
        return Some(dt.unix_timestamp());
    }
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(dt.unix_timestamp());
    }
    // Obsolete zone names ("GMT", "EST") are common in RSS.
    if let Ok(dt) = chrono::DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp());
    }
    let day = format_description!("[year]-[month]-[day]");
    Date::parse(s, &day)
        .ok()
        .map(|d| d.midnight().assume_utc().unix_timestamp())
}

/// Turn one raw entry into an `Article`, or reject it (`None`).
pub fn normalize_entry(source: &Arc<SourceDescriptor>, raw: &RawEntry) -> Option<Article> {
    let title = normalize_text(raw.first_of(TITLE_KEYS)?);
    if title.is_empty() {
        return None;
    }
    let url = raw.first_of(URL_KEYS)?.trim().to_string();

    let summary = raw
        .first_of(SUMMARY_KEYS)
        .map(normalize_text)
        .unwrap_or_default();
    let published_at = raw.first_of(PUBLISHED_KEYS).and_then(parse_published);

    Some(Article {
        title,
        url,
        summary,
        published_at,
        source: Arc::clone(source),
    })
}

/// Normalize a batch in input order. Returns `(articles, rejected_count)`.
pub fn normalize_batch(pairs: Vec<(Arc<SourceDescriptor>, RawEntry)>) -> (Vec<Article>, usize) {
    let mut rejected = 0usize;
    let mut out = Vec::with_capacity(pairs.len());
    for (source, raw) in &pairs {
        match normalize_entry(source, raw) {
            Some(a) => out.push(a),
            None => rejected += 1,
        }
    }
    (out, rejected)
}

/// Fetch from every provider in the given order.
/// A failing provider contributes zero entries; the run continues.
pub async fn collect_entries(
    providers: &[Box<dyn FeedProvider>],
) -> Vec<(Arc<SourceDescriptor>, RawEntry)> {
    ensure_metrics_described();

    let mut out = Vec::new();
    for p in providers {
        let source = p.source();
        match p.fetch_entries().await {
            Ok(entries) => {
                tracing::debug!(source = %source.name, entries = entries.len(), "provider ok");
                counter!("ingest_entries_total").increment(entries.len() as u64);
                out.extend(entries.into_iter().map(|e| (Arc::clone(source), e)));
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = %source.name, "provider error");
                counter!("ingest_provider_errors_total").increment(1);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src() -> Arc<SourceDescriptor> {
        Arc::new(SourceDescriptor::new("NIH", 10, "Medical Research"))
    }

    #[test]
    fn normalize_text_collapses_ws_and_keeps_question_mark() {
        let s = "  Is&nbsp;&nbsp; coffee <b>good</b> for you?  ";
        assert_eq!(normalize_text(s), "Is coffee good for you?");
    }

    #[test]
    fn missing_title_or_url_rejects() {
        let s = src();
        let no_title: RawEntry = [("link", "https://x.test/a")].into_iter().collect();
        let no_url: RawEntry = [("title", "Hello")].into_iter().collect();
        let blank_title: RawEntry = [("title", "  <p></p> "), ("link", "https://x.test/b")]
            .into_iter()
            .collect();
        assert!(normalize_entry(&s, &no_title).is_none());
        assert!(normalize_entry(&s, &no_url).is_none());
        assert!(normalize_entry(&s, &blank_title).is_none());
    }

    #[test]
    fn aliases_and_defaults_apply() {
        let raw: RawEntry = [
            ("title", "Walking Daily"),
            ("url", "https://x.test/walk"),
            ("description", "<p>Ten minutes helps.</p>"),
            ("pubDate", "not a date"),
        ]
        .into_iter()
        .collect();
        let a = normalize_entry(&src(), &raw).expect("accepted");
        assert_eq!(a.url, "https://x.test/walk");
        assert_eq!(a.summary, "Ten minutes helps.");
        assert_eq!(a.published_at, None);

        let bare: RawEntry = [("title", "T"), ("link", "https://x.test/t")]
            .into_iter()
            .collect();
        assert_eq!(normalize_entry(&src(), &bare).unwrap().summary, "");
    }

    #[test]
    fn timestamp_formats_parse() {
        let rfc2822 = parse_published("Mon, 06 Oct 2025 12:00:00 +0000");
        let gmt = parse_published("Mon, 06 Oct 2025 12:00:00 GMT");
        let rfc3339 = parse_published("2025-10-06T12:00:00Z");
        assert_eq!(rfc2822, Some(1_759_752_000));
        assert_eq!(gmt, rfc2822);
        assert_eq!(rfc3339, rfc2822);
        assert_eq!(parse_published("2025-10-06"), Some(1_759_708_800));
        assert_eq!(parse_published("yesterday-ish"), None);
        assert_eq!(parse_published(""), None);
    }

    #[test]
    fn batch_preserves_order_and_counts_rejects() {
        let s = src();
        let pairs = vec![
            (
                Arc::clone(&s),
                [("title", "B"), ("link", "u2")].into_iter().collect(),
            ),
            (Arc::clone(&s), RawEntry::new()),
            (
                Arc::clone(&s),
                [("title", "A"), ("link", "u1")].into_iter().collect(),
            ),
        ];
        let (articles, rejected) = normalize_batch(pairs);
        assert_eq!(rejected, 1);
        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);
    }
}
