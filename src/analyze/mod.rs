// src/analyze/mod.rs
//! Ranking pipeline: normalize → dedup → score → select.
//!
//! Data flows strictly forward and nothing survives between runs. The caller
//! supplies `now` so a run is a pure function of its inputs (plus whatever an
//! external scorer answers).

pub mod ai_adapter;
pub mod dedup;
pub mod rationale;
pub mod scoring;
pub mod select;
pub mod weights;

use metrics::{counter, gauge, histogram};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::ingest::types::{Article, RawEntry};
use crate::ingest::{ensure_metrics_described, normalize_batch};
use crate::sources::SourceDescriptor;

// Re-export convenient types.
pub use crate::analyze::dedup::Deduplicator;
pub use crate::analyze::scoring::{
    HeuristicScorer, RankedArticle, ScoreCard, ScoredArticle, ViralScorer,
};
pub use crate::analyze::select::select_top;
pub use crate::analyze::weights::ScoringConfig;

/// Tunables for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub top_k: usize,
    pub similarity_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: select::DEFAULT_TOP_K,
            similarity_threshold: dedup::DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Per-stage counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub received: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub scored: usize,
}

/// Result of a run. `is_empty()` is the "nothing found" signal; it is a valid
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    pub articles: Vec<ScoredArticle>,
    pub stats: RunStats,
}

impl Ranking {
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn records(&self) -> Vec<RankedArticle> {
        self.articles.iter().map(ScoredArticle::to_record).collect()
    }
}

/// Score every article in order, as one batch on one scale.
pub async fn score_all(
    articles: Vec<Article>,
    scorer: &dyn ViralScorer,
    now: i64,
) -> Vec<ScoredArticle> {
    let cards = scorer.score_batch(&articles, now).await;
    let mut out = Vec::with_capacity(articles.len());
    for (article, card) in articles.into_iter().zip(cards) {
        debug!(
            score = card.score,
            breakdown = ?card.breakdown,
            title = %article.title,
            "scored"
        );
        histogram!("viral_score").record(card.score as f64);
        out.push(ScoredArticle::new(article, card));
    }
    out
}

/// Full pipeline over `(source, raw entry)` pairs already in merge order.
pub async fn rank(
    pairs: Vec<(Arc<SourceDescriptor>, RawEntry)>,
    scorer: &dyn ViralScorer,
    cfg: &PipelineConfig,
    now: i64,
) -> Ranking {
    ensure_metrics_described();

    let received = pairs.len();
    let (articles, rejected) = normalize_batch(pairs);
    let (unique, duplicates) = Deduplicator::new(cfg.similarity_threshold).dedup(articles);
    let scored = score_all(unique, scorer, now).await;
    let stats = RunStats {
        received,
        rejected,
        duplicates,
        scored: scored.len(),
    };
    let top = select_top(scored, cfg.top_k);

    counter!("ingest_rejected_total").increment(rejected as u64);
    counter!("dedup_dropped_total").increment(duplicates as u64);
    counter!("articles_scored_total").increment(stats.scored as u64);
    gauge!("pipeline_last_run_ts").set(now as f64);

    if top.is_empty() {
        warn!(?stats, "no articles survived the pipeline");
    } else {
        info!(
            scorer = scorer.name(),
            received,
            rejected,
            duplicates,
            scored = stats.scored,
            selected = top.len(),
            best = top[0].score,
            "ranking complete"
        );
    }

    Ranking {
        articles: top,
        stats,
    }
}
