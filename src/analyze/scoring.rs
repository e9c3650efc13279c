//! Viral scorer.
//!
//! `ViralScorer` is the seam between the deterministic heuristic below and the
//! external-service scorer in `ai_adapter`. The heuristic is a pure function of
//! `(Article, ScoringConfig, now)`: additive signal families, summed, then
//! clamped to `[0, 100]`. Rationale is produced by a separate pass
//! (`rationale::explain`) and never feeds back into the number.
//!
//! Keyword, surprise and action vocabularies are compiled into `RegexSet`s of
//! escaped literals, so one pass over the lowercased text finds every
//! matching phrase. Semantics stay plain substring containment: "diet" also
//! fires inside "dietary".

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::RegexSet;
use serde::Serialize;

use super::rationale::explain;
use super::weights::ScoringConfig;
use crate::ingest::types::Article;

pub const MAX_SCORE: u8 = 100;

/// One named term of the additive score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Contribution {
    pub signal: &'static str,
    pub points: i32,
}

/// Scorer output for one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCard {
    pub score: u8,
    pub rationale: Vec<String>,
    /// Non-zero contributions in evaluation order. Empty for external scorers.
    pub breakdown: Vec<Contribution>,
}

#[async_trait]
pub trait ViralScorer: Send + Sync {
    async fn score(&self, article: &Article, now: i64) -> ScoreCard;

    /// Score a whole run. Every card in the result must come from the same
    /// scale, so implementations that can fail part-way override this.
    async fn score_batch(&self, articles: &[Article], now: i64) -> Vec<ScoreCard> {
        let mut cards = Vec::with_capacity(articles.len());
        for article in articles {
            cards.push(self.score(article, now).await);
        }
        cards
    }

    fn name(&self) -> &'static str;
}

/// An article together with the score and rationale assigned this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredArticle {
    pub article: Article,
    pub score: u8,
    pub rationale: Vec<String>,
}

/// Flat output record for reporting sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct RankedArticle {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub viral_score: u8,
    pub rationale: Vec<String>,
    pub source: String,
    pub credibility: u8,
    pub category: String,
    pub published_at: Option<i64>,
}

impl ScoredArticle {
    pub fn new(article: Article, card: ScoreCard) -> Self {
        Self {
            article,
            score: card.score.min(MAX_SCORE),
            rationale: card.rationale,
        }
    }

    pub fn to_record(&self) -> RankedArticle {
        let a = &self.article;
        RankedArticle {
            title: a.title.clone(),
            url: a.url.clone(),
            summary: a.summary.clone(),
            viral_score: self.score,
            rationale: self.rationale.clone(),
            source: a.source.name.clone(),
            credibility: a.source.credibility,
            category: a.source.category.clone(),
            published_at: a.published_at,
        }
    }
}

pub fn clamp_score(raw: i32) -> u8 {
    raw.clamp(0, MAX_SCORE as i32) as u8
}

/// Deterministic keyword/metadata heuristic.
#[derive(Debug, Clone)]
pub struct HeuristicScorer {
    cfg: ScoringConfig,
    keywords: RegexSet,
    surprise: RegexSet,
    actions: RegexSet,
}

fn phrase_set<'a>(terms: impl IntoIterator<Item = &'a str>, what: &str) -> Result<RegexSet> {
    RegexSet::new(terms.into_iter().map(regex::escape))
        .with_context(|| format!("compiling {what} phrases"))
}

const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_DAY: i64 = 86_400;

impl HeuristicScorer {
    pub fn new(cfg: ScoringConfig) -> Result<Self> {
        let cfg = cfg.sanitized();
        let keywords = phrase_set(cfg.keywords.iter().map(|k| k.term.as_str()), "keyword")?;
        let surprise = phrase_set(cfg.surprise_terms.iter().map(String::as_str), "surprise")?;
        let actions = phrase_set(cfg.action_terms.iter().map(String::as_str), "action")?;
        Ok(Self {
            cfg,
            keywords,
            surprise,
            actions,
        })
    }

    /// Heuristic over the built-in seed tables.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ScoringConfig::default())
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.cfg
    }

    /// Pure scoring: same article + same `now` → same card.
    pub fn evaluate(&self, article: &Article, now: i64) -> ScoreCard {
        let breakdown = self.contributions(article, now);
        let raw: i32 = breakdown.iter().map(|c| c.points).sum();
        ScoreCard {
            score: clamp_score(raw),
            rationale: explain(article, now, &self.cfg),
            breakdown,
        }
    }

    fn contributions(&self, article: &Article, now: i64) -> Vec<Contribution> {
        let cfg = &self.cfg;
        let text = article.text().to_lowercase();
        let title = article.title.to_lowercase();
        let mut out: Vec<Contribution> = Vec::new();
        let mut push = |signal: &'static str, points: i32| {
            if points != 0 {
                out.push(Contribution { signal, points });
            }
        };

        // Keyword vocabulary: every matching phrase counts once.
        let keywords: i32 = self
            .keywords
            .matches(&text)
            .iter()
            .map(|i| cfg.keywords[i].weight)
            .sum();
        push("keywords", keywords);

        // Recency bonus and stale penalty; unknown age contributes nothing.
        if let Some(age) = article.age_secs(now) {
            let bonus = cfg
                .recency
                .iter()
                .find(|b| age < b.max_age_hours.saturating_mul(SECS_PER_HOUR))
                .map_or(0, |b| b.bonus);
            push("recency", bonus);

            let days = age / SECS_PER_DAY;
            if days > cfg.stale.after_days {
                let over = (days - cfg.stale.after_days).min(i32::MAX as i64) as i32;
                push(
                    "stale_penalty",
                    -cfg.stale.per_day.saturating_mul(over).min(cfg.stale.cap),
                );
            }
        }

        if title.contains('?') {
            push("question", cfg.question_bonus);
        }

        if cfg
            .personal_terms
            .iter()
            .any(|t| title.contains(t.as_str()))
        {
            push("personal_address", cfg.personal_bonus);
        }

        if title
            .split_whitespace()
            .any(|tok| tok.chars().any(|c| c.is_ascii_digit()))
        {
            push("numeric", cfg.numeric_bonus);
        }

        let words = title.split_whitespace().count();
        let bands = &cfg.title_length;
        let length_bonus = if words > bands.mid_max_words {
            bands.long_bonus
        } else if words >= bands.mid_min_words {
            bands.mid_bonus
        } else {
            0
        };
        push("title_length", length_bonus);

        let surprises = self.surprise.matches(&text).iter().count() as i32;
        push(
            "surprise",
            surprises.saturating_mul(cfg.surprise_bonus).min(cfg.surprise_cap),
        );

        if self.actions.is_match(&text) {
            push("actionability", cfg.action_bonus);
        }

        let credibility = article.source.credibility;
        let cred_bonus = cfg
            .credibility_tiers
            .iter()
            .find(|t| credibility >= t.min)
            .map_or(0, |t| t.bonus);
        push("credibility", cred_bonus);

        if cfg
            .boosted_categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(article.source.category.trim()))
        {
            push("category", cfg.category_bonus);
        }

        out
    }
}

#[async_trait]
impl ViralScorer for HeuristicScorer {
    async fn score(&self, article: &Article, now: i64) -> ScoreCard {
        self.evaluate(article, now)
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}
