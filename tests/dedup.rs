// tests/dedup.rs
use health_viral_ranker::analyze::dedup::{title_tokens, Deduplicator};
use health_viral_ranker::{Article, SourceDescriptor};
use rand::{rngs::StdRng, seq::IndexedRandom, Rng, SeedableRng};
use std::sync::Arc;

fn art(title: &str, source: &Arc<SourceDescriptor>) -> Article {
    Article {
        title: title.to_string(),
        url: format!("https://{}.test/{}", source.name, title.len()),
        summary: String::new(),
        published_at: None,
        source: Arc::clone(source),
    }
}

#[test]
fn punctuation_only_difference_collapses() {
    let a = Arc::new(SourceDescriptor::new("a", 5, "x"));
    let b = Arc::new(SourceDescriptor::new("b", 9, "x"));
    let (kept, dropped) = Deduplicator::default().dedup(vec![
        art("Scientists Discover New Heart Treatment", &a),
        art("Scientists discover new heart treatment!!", &b),
    ]);
    assert_eq!(dropped, 1);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].source.name, "a", "first seen wins even over a more credible source");
}

#[test]
fn identical_titles_keep_first() {
    let s = Arc::new(SourceDescriptor::new("s", 5, "x"));
    let mut first = art("Measles outbreak spreads", &s);
    first.url = "https://s.test/first".into();
    let mut second = art("Measles outbreak spreads", &s);
    second.url = "https://s.test/second".into();
    let (kept, _) = Deduplicator::default().dedup(vec![first, second]);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].url, "https://s.test/first");
}

#[test]
fn overlap_is_asymmetric() {
    let s = Arc::new(SourceDescriptor::new("s", 5, "x"));
    // Short title first: the longer one covers all of its tokens.
    let (kept, _) = Deduplicator::default().dedup(vec![
        art("Heart treatment", &s),
        art("Heart treatment approved for children in Europe", &s),
    ]);
    assert_eq!(kept.len(), 1);

    // Long title first: only 2 of its 7 tokens reappear.
    let (kept, _) = Deduplicator::default().dedup(vec![
        art("Heart treatment approved for children in Europe", &s),
        art("Heart treatment", &s),
    ]);
    assert_eq!(kept.len(), 2);
}

#[test]
fn dedup_is_idempotent_on_random_batches() {
    let s = Arc::new(SourceDescriptor::new("s", 5, "x"));
    let vocab = [
        "cancer", "heart", "sleep", "study", "new", "coffee", "risk", "diet", "brain", "walking",
        "vaccine", "trial",
    ];
    let mut rng = StdRng::seed_from_u64(7);
    let d = Deduplicator::default();

    for _ in 0..50 {
        let n = rng.random_range(1..30);
        let batch: Vec<Article> = (0..n)
            .map(|_| {
                let words = rng.random_range(0..6);
                let title: Vec<&str> = (0..words)
                    .map(|_| *vocab.choose(&mut rng).unwrap())
                    .collect();
                art(&title.join(" "), &s)
            })
            .collect();

        let (once, _) = d.dedup(batch);
        let (twice, dropped) = d.dedup(once.clone());
        assert_eq!(dropped, 0);
        assert_eq!(once, twice);
    }
}

#[test]
fn empty_title_tokens() {
    assert!(title_tokens("  ?!  ").is_empty());
}
