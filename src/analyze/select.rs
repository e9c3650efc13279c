//! Top-K selection over scored articles.
//!
//! Stable descending sort: equal scores keep their input order, so source
//! registry order and dedup order are part of the observable result.

use super::scoring::ScoredArticle;

pub const DEFAULT_TOP_K: usize = 3;

pub fn select_top(mut items: Vec<ScoredArticle>, k: usize) -> Vec<ScoredArticle> {
    // `sort_by` is stable.
    items.sort_by(|a, b| b.score.cmp(&a.score));
    items.truncate(k);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::Article;
    use crate::sources::SourceDescriptor;
    use std::sync::Arc;

    fn scored(tag: &str, score: u8) -> ScoredArticle {
        ScoredArticle {
            article: Article {
                title: tag.into(),
                url: format!("https://x.test/{tag}"),
                summary: String::new(),
                published_at: None,
                source: Arc::new(SourceDescriptor::new("S", 5, "x")),
            },
            score,
            rationale: vec![],
        }
    }

    fn tags(v: &[ScoredArticle]) -> Vec<&str> {
        v.iter().map(|s| s.article.title.as_str()).collect()
    }

    #[test]
    fn picks_highest() {
        let items = vec![scored("a", 50), scored("b", 80), scored("c", 50), scored("d", 90)];
        let top = select_top(items, 2);
        assert_eq!(tags(&top), vec!["d", "b"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let items = vec![scored("x", 80), scored("y", 80), scored("z", 50)];
        assert_eq!(tags(&select_top(items, 2)), vec!["x", "y"]);
    }

    #[test]
    fn zero_and_oversized_k() {
        assert!(select_top(vec![scored("a", 1)], 0).is_empty());
        assert_eq!(select_top(vec![scored("a", 1)], 10).len(), 1);
        assert!(select_top(vec![], 3).is_empty());
    }
}
