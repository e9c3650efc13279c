// tests/ingest_normalize.rs
use health_viral_ranker::ingest::{normalize_batch, normalize_text};
use health_viral_ranker::{RawEntry, SourceDescriptor};
use std::sync::Arc;

#[test]
fn empty_is_ok() {
    assert_eq!(normalize_text(""), "");
}

#[test]
fn strips_html_and_unescapes() {
    let s = "<p>Hello&nbsp;<b>world</b> &ldquo;ok&rdquo;</p>";
    let n = normalize_text(s);
    assert_eq!(n, r#"Hello world "ok""#);
}

#[test]
fn folds_whitespace_and_nbsp() {
    let s = "A\u{00A0}\n\tB   C";
    let n = normalize_text(s);
    assert_eq!(n, "A B C");
}

#[test]
fn length_cap_applies() {
    let s = "x".repeat(2_000);
    let n = normalize_text(&s);
    assert!(n.chars().count() <= 1_500);
}

#[test]
fn empty_entry_set_yields_no_articles() {
    let (articles, rejected) = normalize_batch(Vec::new());
    assert!(articles.is_empty());
    assert_eq!(rejected, 0);
}

#[test]
fn articles_share_their_source_descriptor() {
    let src = Arc::new(SourceDescriptor::new("WHO News", 10, "Public Health"));
    let raw: RawEntry = [("title", "Measles cases rise"), ("link", "https://who.test/m")]
        .into_iter()
        .collect();
    let (articles, _) = normalize_batch(vec![(Arc::clone(&src), raw.clone()), (src.clone(), raw)]);
    assert_eq!(articles.len(), 2);
    assert!(Arc::ptr_eq(&articles[0].source, &src));
    assert!(Arc::ptr_eq(&articles[1].source, &src));
}
