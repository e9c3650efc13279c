//! Batch entrypoint: fetch every configured feed once, rank, write artifacts.
//!
//! One pass, no state between runs. A feed that fails to load contributes
//! zero articles; an empty ranking is reported, not treated as a failure.
//! Anything that does fail the run still leaves `daily_articles.txt` with the
//! error, and the process exits non-zero.

use anyhow::{Context, Result};
use health_viral_ranker::analyze::ai_adapter::build_scorer;
use health_viral_ranker::analyze::ScoringConfig;
use health_viral_ranker::config::{ai::AiConfig, AppConfig};
use health_viral_ranker::ingest::providers::RssProvider;
use health_viral_ranker::ingest::{collect_entries, config as sources_config};
use health_viral_ranker::metrics::Metrics;
use health_viral_ranker::{rank, report};
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("health_viral_ranker=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn record_failure(dir: &Path, err: &anyhow::Error) {
    error!(error = ?err, "run failed");
    match report::write_error_notice(dir, err) {
        Ok(p) => info!(path = %p.display(), "error notice written"),
        Err(e) => warn!(error = ?e, "error notice not written"),
    }
}

async fn run(app: &AppConfig, metrics: Option<&Metrics>) -> Result<()> {
    let registry = match &app.sources_path {
        Some(p) => sources_config::load_sources_from(p)?,
        None => sources_config::load_sources_default()?,
    };
    let scoring = match &app.scoring_path {
        Some(p) => ScoringConfig::load_from_file(p)?,
        None => ScoringConfig::default(),
    };
    let ai = match &app.ai_path {
        Some(p) => AiConfig::load_from_file(p)?,
        None => AiConfig::load_default()?,
    };
    let scorer = build_scorer(&ai, scoring)?;

    info!(
        sources = registry.len(),
        top_k = app.top_k,
        similarity = app.similarity_threshold,
        scorer = scorer.name(),
        "starting run"
    );

    let providers = RssProvider::for_sources(registry.iter())?;
    let pairs = collect_entries(&providers).await;

    let now = chrono::Utc::now().timestamp();
    let ranking = rank(pairs, scorer.as_ref(), &app.pipeline(), now).await;

    let date = report::report_date(now);
    let written = report::write_artifacts(&app.output_dir, &ranking, &date)?;
    for p in &written {
        info!(path = %p.display(), "artifact written");
    }

    if app.write_metrics {
        if let Some(m) = metrics {
            if let Err(e) = m.write_snapshot(&app.output_dir) {
                warn!(error = ?e, "metrics snapshot not written");
            }
        }
    }

    print!("{}", report::render_text(&ranking.articles, &date));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op elsewhere.
    let _ = dotenvy::dotenv();
    init_tracing();

    let metrics = match Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            warn!(error = ?e, "metrics disabled");
            None
        }
    };

    let app = match AppConfig::load_default().context("loading app config") {
        Ok(app) => app,
        Err(e) => {
            record_failure(&AppConfig::default().output_dir, &e);
            return Err(e);
        }
    };

    if let Err(e) = run(&app, metrics.as_ref()).await {
        record_failure(&app.output_dir, &e);
        return Err(e);
    }
    Ok(())
}
