// tests/scoring.rs
use health_viral_ranker::analyze::scoring::{HeuristicScorer, ViralScorer};
use health_viral_ranker::analyze::ScoringConfig;
use health_viral_ranker::{Article, SourceDescriptor};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Arc;

const NOW: i64 = 1_759_752_000; // 2025-10-06T12:00:00Z
const HOUR: i64 = 3_600;

fn article(title: &str, summary: &str, published_at: Option<i64>, cred: u8, cat: &str) -> Article {
    Article {
        title: title.to_string(),
        url: "https://x.test/a".to_string(),
        summary: summary.to_string(),
        published_at,
        source: Arc::new(SourceDescriptor::new("Src", cred, cat)),
    }
}

#[test]
fn breakthrough_cancer_cure_scenario() {
    let scorer = HeuristicScorer::with_defaults().unwrap();
    let a = article(
        "New Study Finds Breakthrough Cancer Cure",
        "...",
        Some(NOW - 6 * HOUR),
        10,
        "Oncology",
    );
    let card = scorer.evaluate(&a, NOW);

    // keywords 6+5+4+2+5 (+ "finds"), recency 15, credibility 8, category 3
    assert!(card.score >= 48, "score was {}", card.score);
    assert!(card.score <= 100);
    assert!(card
        .rationale
        .contains(&"Major scientific breakthrough".to_string()));
    assert!(card
        .rationale
        .contains(&"Critical health condition with high public interest".to_string()));
    assert!(card.rationale.len() <= 4);

    let kw = card
        .breakdown
        .iter()
        .find(|c| c.signal == "keywords")
        .map(|c| c.points)
        .unwrap();
    assert!(kw >= 22);
}

#[test]
fn scoring_is_deterministic_for_fixed_now() {
    let scorer = HeuristicScorer::with_defaults().unwrap();
    let a = article(
        "Why your sleep habit may protect your brain?",
        "Researchers share 3 surprising tips",
        Some(NOW - 30 * HOUR),
        8,
        "Wellness",
    );
    assert_eq!(scorer.evaluate(&a, NOW), scorer.evaluate(&a, NOW));
}

#[tokio::test]
async fn trait_and_inherent_paths_agree() {
    let scorer = HeuristicScorer::with_defaults().unwrap();
    let a = article("Coffee and longevity", "", Some(NOW - HOUR), 9, "Nutrition");
    let via_trait = ViralScorer::score(&scorer, &a, NOW).await;
    assert_eq!(via_trait, scorer.evaluate(&a, NOW));
    assert_eq!(scorer.name(), "heuristic");
}

#[test]
fn score_is_always_within_bounds() {
    // Extreme weights in both directions so the clamp actually engages.
    let mut cfg = ScoringConfig::default();
    for k in cfg.keywords.iter_mut().step_by(2) {
        k.weight *= 10;
    }
    cfg.stale.cap = 500;
    cfg.stale.per_day = 50;
    let hot = HeuristicScorer::new(cfg).unwrap();
    let seed = HeuristicScorer::with_defaults().unwrap();

    let words = [
        "breakthrough", "cure", "cancer", "you", "?", "2025", "shocking", "secret", "how to",
        "sleep", "diet", "study", "weight loss", "ordinary", "update", "the",
    ];
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..500 {
        let n = rng.random_range(0..20);
        let title: Vec<&str> = (0..n).map(|_| words[rng.random_range(0..words.len())]).collect();
        let published = if rng.random_bool(0.2) {
            None
        } else {
            Some(NOW - rng.random_range(-5..2_000) * HOUR)
        };
        let a = article(
            &title.join(" "),
            "",
            published,
            rng.random_range(0..=10),
            if rng.random_bool(0.5) { "Oncology" } else { "Misc" },
        );
        for s in [&hot, &seed] {
            let card = s.evaluate(&a, NOW);
            assert!(card.score <= 100);
            assert!(!card.rationale.is_empty() && card.rationale.len() <= 4);
        }
    }
}

#[test]
fn very_old_articles_bottom_out_at_zero() {
    let scorer = HeuristicScorer::with_defaults().unwrap();
    let a = article("Quarterly update", "", Some(NOW - 400 * 24 * HOUR), 0, "Misc");
    assert_eq!(scorer.evaluate(&a, NOW).score, 0);
}

#[test]
fn unknown_recency_contributes_nothing() {
    let scorer = HeuristicScorer::with_defaults().unwrap();
    let known = article("Quarterly update", "", Some(NOW - 400 * 24 * HOUR), 10, "Misc");
    let unknown = article("Quarterly update", "", None, 10, "Misc");
    assert_eq!(scorer.evaluate(&unknown, NOW).score, 8);
    assert!(scorer.evaluate(&known, NOW).score < 8);
}

#[test]
fn custom_keyword_table_is_honored() {
    let cfg = ScoringConfig {
        keywords: vec![health_viral_ranker::analyze::weights::KeywordWeight {
            term: "Kale".into(),
            weight: 6,
        }],
        ..ScoringConfig::default()
    };
    let scorer = HeuristicScorer::new(cfg).unwrap();
    let a = article("Kale everywhere", "", None, 0, "Misc");
    assert_eq!(scorer.evaluate(&a, NOW).score, 6);
    let b = article("Breakthrough cancer cure", "", None, 0, "Misc");
    assert_eq!(scorer.evaluate(&b, NOW).score, 0);
}
