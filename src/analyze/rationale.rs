//! Rationale pass: short human-readable reasons explaining a score.
//!
//! Independent of the numeric score. Categories are checked in priority
//! order; within a category the first matching cue emits its reason.
//! Output is capped at `max_reasons`; when nothing matches, `fallback` is used.
//!
//! Trigger kinds (case-insensitive substring matching):
//! - `any_contains`:    any term in `title + " " + summary`
//! - `title_contains`:  any term in the title
//! - `min_credibility`: source credibility >= min
//! - `max_age_hours`:   known age < hours
//! - `surprise_terms`, `action_terms`: any of the scorer's own vocabulary,
//!   so a config that retunes those lists retunes the explanation with them

use serde::{Deserialize, Serialize};

use super::weights::ScoringConfig;
use crate::ingest::types::Article;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    AnyContains { terms: Vec<String> },
    TitleContains { terms: Vec<String> },
    MinCredibility { min: u8 },
    MaxAgeHours { hours: i64 },
    SurpriseTerms,
    ActionTerms,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RationaleCue {
    pub when: Trigger,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RationaleCategory {
    pub id: String,
    pub cues: Vec<RationaleCue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RationaleConfig {
    pub categories: Vec<RationaleCategory>,
    pub max_reasons: usize,
    pub fallback: String,
}

fn any(terms: &[&str]) -> Trigger {
    Trigger::AnyContains {
        terms: terms.iter().map(|s| s.to_string()).collect(),
    }
}

fn in_title(terms: &[&str]) -> Trigger {
    Trigger::TitleContains {
        terms: terms.iter().map(|s| s.to_string()).collect(),
    }
}

fn category(id: &str, cues: Vec<(Trigger, &str)>) -> RationaleCategory {
    RationaleCategory {
        id: id.to_string(),
        cues: cues
            .into_iter()
            .map(|(when, reason)| RationaleCue {
                when,
                reason: reason.to_string(),
            })
            .collect(),
    }
}

impl Default for RationaleConfig {
    fn default() -> Self {
        let categories = vec![
            category(
                "breakthrough",
                vec![
                    (
                        any(&[
                            "breakthrough",
                            "revolutionary",
                            "first-ever",
                            "game-changer",
                            "game changer",
                            "discovery",
                            "discover",
                        ]),
                        "Major scientific breakthrough",
                    ),
                    (
                        any(&["cure", "reverse", "miracle"]),
                        "Promise of a cure or reversal",
                    ),
                ],
            ),
            category(
                "major_condition",
                vec![
                    (
                        any(&[
                            "cancer",
                            "heart disease",
                            "heart attack",
                            "diabetes",
                            "alzheimer",
                            "dementia",
                            "stroke",
                            "obesity",
                        ]),
                        "Critical health condition with high public interest",
                    ),
                    (
                        any(&["covid", "outbreak", "vaccine", "virus", "flu"]),
                        "Infectious disease news with broad public concern",
                    ),
                ],
            ),
            category(
                "popular_topic",
                vec![
                    (
                        any(&["weight loss", "ozempic", "diet", "fasting"]),
                        "Weight and diet topics trend strongly on social media",
                    ),
                    (
                        any(&["sleep", "mental health", "anxiety", "depression", "stress"]),
                        "Mental health and sleep topics resonate widely",
                    ),
                    (
                        any(&["longevity", "anti-aging", "healthy aging", "life expectancy"]),
                        "Longevity content attracts high engagement",
                    ),
                    (
                        any(&[
                            "coffee",
                            "exercise",
                            "walking",
                            "gut health",
                            "microbiome",
                            "supplement",
                            "vitamin",
                        ]),
                        "Everyday wellness habit with broad appeal",
                    ),
                ],
            ),
            category(
                "question_format",
                vec![(
                    in_title(&["?"]),
                    "Question headline invites curiosity and comments",
                )],
            ),
            category(
                "personal_relevance",
                vec![(in_title(&["you", "your"]), "Speaks directly to the reader")],
            ),
            category(
                "research_backing",
                vec![(
                    any(&[
                        "study",
                        "research",
                        "scientists",
                        "researchers",
                        "clinical trial",
                        "trial",
                    ]),
                    "Backed by new scientific research",
                )],
            ),
            category(
                "surprise",
                vec![(Trigger::SurpriseTerms, "Surprising or counterintuitive finding")],
            ),
            category(
                "actionability",
                vec![(Trigger::ActionTerms, "Actionable advice readers can apply today")],
            ),
            category(
                "high_credibility_source",
                vec![(
                    Trigger::MinCredibility { min: 9 },
                    "Reported by a highly credible source",
                )],
            ),
            category(
                "breaking_recency",
                vec![(
                    Trigger::MaxAgeHours { hours: 24 },
                    "Breaking news from the last 24 hours",
                )],
            ),
        ];

        Self {
            categories,
            max_reasons: 4,
            fallback: "General health interest with broad audience appeal".to_string(),
        }
    }
}

/// Lowercased views of an article, computed once per explanation.
struct View<'a> {
    text: String,
    title: String,
    article: &'a Article,
    vocab: &'a ScoringConfig,
    now: i64,
}

impl View<'_> {
    fn matches(&self, t: &Trigger) -> bool {
        match t {
            Trigger::AnyContains { terms } => contains_any(&self.text, terms),
            Trigger::TitleContains { terms } => contains_any(&self.title, terms),
            Trigger::MinCredibility { min } => self.article.source.credibility >= *min,
            Trigger::MaxAgeHours { hours } => self
                .article
                .age_secs(self.now)
                .is_some_and(|age| age < hours.saturating_mul(3600)),
            Trigger::SurpriseTerms => contains_any(&self.text, &self.vocab.surprise_terms),
            Trigger::ActionTerms => contains_any(&self.text, &self.vocab.action_terms),
        }
    }
}

fn contains_any(haystack: &str, terms: &[String]) -> bool {
    terms.iter().any(|t| {
        let t = t.trim().to_lowercase();
        !t.is_empty() && haystack.contains(t.as_str())
    })
}

/// Explain an article: ordered reasons, most salient first.
/// The cue table is `scoring.rationale`; vocabulary triggers read the
/// surprise and action lists from the same config.
pub fn explain(article: &Article, now: i64, scoring: &ScoringConfig) -> Vec<String> {
    let cfg = &scoring.rationale;
    let view = View {
        text: article.text().to_lowercase(),
        title: article.title.to_lowercase(),
        article,
        vocab: scoring,
        now,
    };

    let mut reasons: Vec<String> = cfg
        .categories
        .iter()
        .filter_map(|c| c.cues.iter().find(|cue| view.matches(&cue.when)))
        .map(|cue| cue.reason.clone())
        .take(cfg.max_reasons)
        .collect();

    if reasons.is_empty() {
        reasons.push(cfg.fallback.clone());
    }
    reasons
}
