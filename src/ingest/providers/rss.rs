// src/ingest/providers/rss.rs
//! Generic RSS 2.0 / Atom provider.
//!
//! Maps each `<item>` (or Atom `<entry>`) onto a `RawEntry` with the field
//! names the normalizer understands. No cleanup happens here beyond what XML
//! parsing needs; normalization is the normalizer's job.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::ingest::types::{FeedProvider, RawEntry};
use crate::sources::SourceDescriptor;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl AtomEntry {
    fn best_link(&self) -> Option<String> {
        self.links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| self.links.first())
            .and_then(|l| l.href.clone())
    }
}

fn text_of(t: Option<AtomText>) -> Option<String> {
    t.and_then(|t| t.value)
}

pub struct RssProvider {
    source: Arc<SourceDescriptor>,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RssProvider {
    /// In-memory XML, used by tests and offline runs.
    pub fn from_fixture(source: Arc<SourceDescriptor>, xml: &str) -> Self {
        Self {
            source,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_url(source: Arc<SourceDescriptor>, url: &str, client: reqwest::Client) -> Self {
        Self {
            source,
            mode: Mode::Http {
                url: url.to_string(),
                client,
            },
        }
    }

    /// Build one provider per source that has a feed URL, in registry order.
    pub fn for_sources<'a>(
        sources: impl IntoIterator<Item = &'a Arc<SourceDescriptor>>,
    ) -> Result<Vec<Box<dyn FeedProvider>>> {
        let client = http_client()?;
        Ok(sources
            .into_iter()
            .filter_map(|s| {
                let url = s.feed_url.clone()?;
                Some(Box::new(Self::from_url(Arc::clone(s), &url, client.clone()))
                    as Box<dyn FeedProvider>)
            })
            .collect())
    }

    /// Parse RSS 2.0 first, then Atom.
    pub fn parse_entries(xml: &str) -> Result<Vec<RawEntry>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(xml);

        let out = match from_str::<Rss>(&xml_clean) {
            Ok(rss) => rss.channel.items.into_iter().map(rss_item_to_raw).collect(),
            Err(rss_err) => {
                let atom: AtomFeed = from_str(&xml_clean)
                    .with_context(|| format!("not rss ({rss_err}) and not atom"))?;
                atom.entries.into_iter().map(atom_entry_to_raw).collect()
            }
        };

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        Ok(out)
    }
}

fn rss_item_to_raw(it: Item) -> RawEntry {
    let mut raw = RawEntry::new();
    for (k, v) in [
        ("title", it.title),
        ("link", it.link),
        ("description", it.description),
        ("pubDate", it.pub_date),
    ] {
        if let Some(v) = v {
            raw.insert(k, v);
        }
    }
    raw
}

fn atom_entry_to_raw(e: AtomEntry) -> RawEntry {
    let link = e.best_link();
    let mut raw = RawEntry::new();
    for (k, v) in [
        ("title", text_of(e.title)),
        ("link", link),
        ("summary", text_of(e.summary).or_else(|| text_of(e.content))),
        ("published", e.published),
        ("updated", e.updated),
    ] {
        if let Some(v) = v {
            raw.insert(k, v);
        }
    }
    raw
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("health-viral-ranker/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(15))
        .build()
        .context("building feed http client")
}

#[async_trait]
impl FeedProvider for RssProvider {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_entries(s),
            Mode::Http { url, client } => {
                let body = client
                    .get(url.as_str())
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .with_context(|| format!("GET {url}"))?
                    .text()
                    .await
                    .with_context(|| format!("reading body of {url}"))?;
                Self::parse_entries(&body)
                    .with_context(|| format!("parsing feed from {}", self.source.name))
            }
        }
    }

    fn source(&self) -> &Arc<SourceDescriptor> {
        &self.source
    }
}

/// HTML entities that are not valid XML but show up in real feeds.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
