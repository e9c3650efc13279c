use health_viral_ranker::ingest::normalize_batch;
use health_viral_ranker::ingest::providers::RssProvider;
use health_viral_ranker::{FeedProvider, SourceDescriptor};
use std::sync::Arc;

const RSS_XML: &str = include_str!("fixtures/health_rss.xml");
const ATOM_XML: &str = include_str!("fixtures/health_atom.xml");

#[tokio::test]
async fn rss_fixture_parses_and_normalizes() {
    let source = Arc::new(SourceDescriptor::new("Health Wire", 8, "Medical Research"));
    let provider = RssProvider::from_fixture(Arc::clone(&source), RSS_XML);

    let entries = provider.fetch_entries().await.expect("rss parse ok");
    assert_eq!(entries.len(), 5);

    let pairs = entries.into_iter().map(|e| (Arc::clone(&source), e)).collect();
    let (articles, rejected) = normalize_batch(pairs);
    assert_eq!(rejected, 1, "the item without a link is dropped");
    assert_eq!(articles.len(), 4);

    let first = &articles[0];
    assert_eq!(first.title, "New Study Finds Breakthrough Cancer Cure");
    assert_eq!(
        first.summary,
        "Researchers report a remarkable result in early patients."
    );
    assert_eq!(first.published_at, Some(1_759_730_400));

    let coffee = articles.last().unwrap();
    assert_eq!(coffee.title, "Is Your Morning Coffee Good for You?");
    assert_eq!(coffee.published_at, None, "bad dates mean unknown recency");
}

#[tokio::test]
async fn atom_fixture_parses() {
    let source = Arc::new(SourceDescriptor::new("Wellness Notes", 6, "Wellness"));
    let provider = RssProvider::from_fixture(Arc::clone(&source), ATOM_XML);

    let entries = provider.fetch_entries().await.expect("atom parse ok");
    assert_eq!(entries.len(), 2);

    let pairs = entries.into_iter().map(|e| (Arc::clone(&source), e)).collect();
    let (articles, rejected) = normalize_batch(pairs);
    assert_eq!(rejected, 0);
    assert_eq!(articles[0].url, "https://notes.example/sleep-habits");
    // `published` wins over `updated`
    assert_eq!(articles[0].published_at, Some(1_759_716_000));
    assert_eq!(articles[1].summary, "Ten minutes can blunt a sugar spike.");
    assert!(articles[1].published_at.is_some());
}

#[tokio::test]
async fn garbage_feed_is_an_error() {
    let source = Arc::new(SourceDescriptor::new("Broken", 1, "x"));
    let provider = RssProvider::from_fixture(source, "");
    assert!(provider.fetch_entries().await.is_err());
}
