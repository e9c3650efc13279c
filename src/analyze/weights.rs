//! Scoring configuration: the keyword-weight table, recency buckets, bonus
//! values and the rationale table, as one immutable object handed to the
//! scorer at construction.
//!
//! Every field defaults to the built-in seed, so a config file only needs
//! the fields it changes. JSON shape (all keys optional):
//! {
//!   "keywords": [{"term": "breakthrough", "weight": 6}],
//!   "recency": [{"max_age_hours": 12, "bonus": 15}],
//!   "stale": {"after_days": 7, "per_day": 2, "cap": 20},
//!   "credibility_tiers": [{"min": 9, "bonus": 8}],
//!   "boosted_categories": ["Oncology"],
//!   ...
//! }

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use super::rationale::RationaleConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordWeight {
    pub term: String,
    pub weight: i32,
}

/// Bonus for articles younger than `max_age_hours`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecencyBucket {
    pub max_age_hours: i64,
    pub bonus: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalePenalty {
    pub after_days: i64,
    pub per_day: i32,
    pub cap: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleLengthBands {
    pub mid_min_words: usize,
    pub mid_max_words: usize,
    pub mid_bonus: i32,
    pub long_bonus: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredibilityTier {
    pub min: u8,
    pub bonus: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub keywords: Vec<KeywordWeight>,
    pub recency: Vec<RecencyBucket>,
    pub stale: StalePenalty,
    pub question_bonus: i32,
    pub personal_terms: Vec<String>,
    pub personal_bonus: i32,
    pub numeric_bonus: i32,
    pub title_length: TitleLengthBands,
    pub surprise_terms: Vec<String>,
    pub surprise_bonus: i32,
    pub surprise_cap: i32,
    pub action_terms: Vec<String>,
    pub action_bonus: i32,
    pub credibility_tiers: Vec<CredibilityTier>,
    pub boosted_categories: Vec<String>,
    pub category_bonus: i32,
    pub rationale: RationaleConfig,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const SURPRISE_TERMS: &[&str] = &[
    "shocking",
    "surprising",
    "surprise",
    "unexpected",
    "secret",
    "hidden",
    "little-known",
    "myth",
    "truth about",
    "revealed",
    "stunning",
    "turns out",
    "you won't believe",
    "counterintuitive",
    "mystery",
];

const ACTION_TERMS: &[&str] = &[
    "how to",
    "tips",
    "ways to",
    "you should",
    "avoid",
    "prevent",
    "steps",
    "guide",
    "what to",
    "try this",
    "simple",
    "habit",
    "boost",
    "reduce your",
    "lower your",
];

impl Default for ScoringConfig {
    fn default() -> Self {
        let keywords = [
            // 6: headline-grade discoveries
            ("breakthrough", 6),
            ("revolutionary", 6),
            ("game-changer", 6),
            ("game changer", 6),
            ("miracle", 6),
            // 5
            ("cure", 5),
            ("new study", 5),
            ("discovery", 5),
            ("first-ever", 5),
            ("reverse", 5),
            ("weight loss", 5),
            ("ozempic", 5),
            ("alzheimer", 5),
            ("longevity", 5),
            ("life expectancy", 5),
            // 4: major conditions and big topics
            ("cancer", 4),
            ("heart disease", 4),
            ("heart attack", 4),
            ("diabetes", 4),
            ("dementia", 4),
            ("stroke", 4),
            ("obesity", 4),
            ("depression", 4),
            ("anxiety", 4),
            ("vaccine", 4),
            ("covid", 4),
            ("mental health", 4),
            ("gut health", 4),
            ("microbiome", 4),
            ("anti-aging", 4),
            ("healthy aging", 4),
            ("brain", 4),
            ("sleep", 4),
            ("autism", 4),
            // 3: everyday wellness
            ("diet", 3),
            ("exercise", 3),
            ("nutrition", 3),
            ("vitamin", 3),
            ("supplement", 3),
            ("coffee", 3),
            ("sugar", 3),
            ("fasting", 3),
            ("inflammation", 3),
            ("immune", 3),
            ("fda", 3),
            ("approved", 3),
            ("clinical trial", 3),
            ("blood pressure", 3),
            ("cholesterol", 3),
            ("protein", 3),
            ("walking", 3),
            ("stress", 3),
            ("ultra-processed", 3),
            ("outbreak", 3),
            // 2: research framing
            ("study", 2),
            ("research", 2),
            ("scientists", 2),
            ("researchers", 2),
            ("doctors", 2),
            ("risk", 2),
            ("linked to", 2),
            ("experts", 2),
            ("treatment", 2),
            ("patients", 2),
            ("finds", 2),
        ]
        .into_iter()
        .map(|(term, weight)| KeywordWeight {
            term: term.to_string(),
            weight,
        })
        .collect();

        let recency = [(12, 15), (24, 12), (48, 8), (72, 4), (168, 2)]
            .into_iter()
            .map(|(max_age_hours, bonus)| RecencyBucket {
                max_age_hours,
                bonus,
            })
            .collect();

        let credibility_tiers = [(9, 8), (7, 5), (5, 2)]
            .into_iter()
            .map(|(min, bonus)| CredibilityTier { min, bonus })
            .collect();

        Self {
            keywords,
            recency,
            stale: StalePenalty {
                after_days: 7,
                per_day: 2,
                cap: 20,
            },
            question_bonus: 3,
            personal_terms: strings(&["you", "your"]),
            personal_bonus: 4,
            numeric_bonus: 3,
            title_length: TitleLengthBands {
                mid_min_words: 10,
                mid_max_words: 15,
                mid_bonus: 2,
                long_bonus: 1,
            },
            surprise_terms: strings(SURPRISE_TERMS),
            surprise_bonus: 3,
            surprise_cap: 9,
            action_terms: strings(ACTION_TERMS),
            action_bonus: 4,
            credibility_tiers,
            boosted_categories: strings(&[
                "Oncology",
                "Nutrition",
                "Mental Health",
                "Fitness",
                "Wellness",
                "Heart Health",
                "Longevity",
            ]),
            category_bonus: 3,
            rationale: RationaleConfig::default(),
        }
    }
}

impl ScoringConfig {
    /// Load from a JSON or TOML file (chosen by extension; JSON otherwise).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading scoring config {}", path.display()))?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        let cfg: ScoringConfig = if is_toml {
            toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?
        } else {
            serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))?
        };
        Ok(cfg.sanitized())
    }

    /// Lowercase and trim every trigger phrase, drop blanks, and order the
    /// recency buckets (youngest first) and credibility tiers (strictest first).
    pub fn sanitized(mut self) -> Self {
        fn clean(v: Vec<String>) -> Vec<String> {
            v.into_iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        }

        self.keywords = self
            .keywords
            .into_iter()
            .filter_map(|k| {
                let term = k.term.trim().to_lowercase();
                (!term.is_empty()).then_some(KeywordWeight {
                    term,
                    weight: k.weight,
                })
            })
            .collect();
        self.personal_terms = clean(self.personal_terms);
        self.surprise_terms = clean(self.surprise_terms);
        self.action_terms = clean(self.action_terms);
        self.boosted_categories = self
            .boosted_categories
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        self.recency.sort_by_key(|b| b.max_age_hours);
        self.credibility_tiers.sort_by(|a, b| b.min.cmp(&a.min));
        self.surprise_cap = self.surprise_cap.max(0);
        self.stale.cap = self.stale.cap.max(0);
        self
    }
}
