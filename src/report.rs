//! Flat output artifacts for a run: a human-readable digest and a JSON array.
//!
//! `daily_articles.txt` is always written: the digest, a "nothing found"
//! notice, or an error notice when the run failed. `daily_articles.json` only
//! when there is something to list.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::{Ranking, ScoredArticle};

pub const TEXT_ARTIFACT: &str = "daily_articles.txt";
pub const JSON_ARTIFACT: &str = "daily_articles.json";

/// "October 19, 2026" for a unix timestamp.
pub fn report_date(now: i64) -> String {
    chrono::DateTime::from_timestamp(now, 0)
        .map(|d| d.format("%B %d, %Y").to_string())
        .unwrap_or_else(|| now.to_string())
}

pub fn render_text(articles: &[ScoredArticle], date: &str) -> String {
    let mut out = String::new();
    if articles.is_empty() {
        let _ = writeln!(out, "No viral health articles found - {date}");
        return out;
    }

    let _ = writeln!(
        out,
        "Top {} Viral Health Articles - {date}\n",
        articles.len()
    );
    for (i, s) in articles.iter().enumerate() {
        let a = &s.article;
        let _ = writeln!(out, "{}. {}", i + 1, a.title);
        let _ = writeln!(out, "   Viral Score: {}/100", s.score);
        let _ = writeln!(out, "   Why it's viral: {}", s.rationale.join("; "));
        let _ = writeln!(out, "   Link: {}", a.url);
        let _ = writeln!(
            out,
            "   Source: {} ({}, credibility {}/10)\n",
            a.source.name, a.source.category, a.source.credibility
        );
    }
    out
}

/// Write the artifacts into `dir` (created if missing). Returns the paths written.
pub fn write_artifacts(dir: &Path, ranking: &Ranking, date: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut written = Vec::with_capacity(2);

    let txt = dir.join(TEXT_ARTIFACT);
    fs::write(&txt, render_text(&ranking.articles, date))
        .with_context(|| format!("writing {}", txt.display()))?;
    written.push(txt);

    if !ranking.is_empty() {
        let json = dir.join(JSON_ARTIFACT);
        let body = serde_json::to_string_pretty(&ranking.records())?;
        fs::write(&json, body).with_context(|| format!("writing {}", json.display()))?;
        written.push(json);
    }

    Ok(written)
}

/// Failure notice in place of the digest, so a failed run still leaves
/// `daily_articles.txt` behind. The full context chain is written.
pub fn write_error_notice(dir: &Path, err: &anyhow::Error) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let txt = dir.join(TEXT_ARTIFACT);
    fs::write(&txt, format!("Error occurred: {err:#}\n"))
        .with_context(|| format!("writing {}", txt.display()))?;
    Ok(txt)
}
