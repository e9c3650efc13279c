// src/config/mod.rs
//! Run configuration.
//!
//! Resolution: `$HVR_CONFIG_PATH` → `config/app.toml` → built-in defaults,
//! then `VIRAL_TOP_K` / `VIRAL_SIMILARITY_THRESHOLD` env overrides on top.
//! Invalid override values are ignored with a warning.

pub mod ai;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::analyze::dedup::DEFAULT_SIMILARITY_THRESHOLD;
use crate::analyze::select::DEFAULT_TOP_K;
use crate::analyze::PipelineConfig;

pub const DEFAULT_APP_CONFIG_PATH: &str = "config/app.toml";
pub const ENV_APP_CONFIG_PATH: &str = "HVR_CONFIG_PATH";
pub const ENV_TOP_K: &str = "VIRAL_TOP_K";
pub const ENV_SIMILARITY_THRESHOLD: &str = "VIRAL_SIMILARITY_THRESHOLD";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How many articles the selector returns.
    pub top_k: usize,
    /// Title-overlap ratio above which two articles are the same story.
    pub similarity_threshold: f64,
    /// Sources file; unset means `ingest::config::load_sources_default`.
    pub sources_path: Option<PathBuf>,
    /// Scoring tables; unset means the built-in seed.
    pub scoring_path: Option<PathBuf>,
    /// AI scorer config; unset means `config/ai.json` if present.
    pub ai_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub write_metrics: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            sources_path: None,
            scoring_path: None,
            ai_path: None,
            output_dir: PathBuf::from("."),
            write_metrics: true,
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)
            .with_context(|| format!("reading app config {}", path.display()))?;
        let cfg: AppConfig =
            toml::from_str(&s).with_context(|| format!("parsing app config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// File resolution plus env overrides.
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_APP_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_APP_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else if Path::new(DEFAULT_APP_CONFIG_PATH).exists() {
            Self::load_from_file(Path::new(DEFAULT_APP_CONFIG_PATH))?
        } else {
            Self::default()
        };
        Ok(base.with_env_overrides())
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(raw) = std::env::var(ENV_TOP_K) {
            match parse_top_k_env(Some(raw.clone())) {
                Some(k) => self.top_k = k,
                None => warn!(var = ENV_TOP_K, value = %raw, "ignoring invalid override"),
            }
        }
        if let Ok(raw) = std::env::var(ENV_SIMILARITY_THRESHOLD) {
            match parse_threshold_env(Some(raw.clone())) {
                Some(t) => self.similarity_threshold = t,
                None => warn!(
                    var = ENV_SIMILARITY_THRESHOLD,
                    value = %raw,
                    "ignoring invalid override"
                ),
            }
        }
        self
    }

    fn sanitized(mut self) -> Self {
        if !self.similarity_threshold.is_finite() {
            self.similarity_threshold = DEFAULT_SIMILARITY_THRESHOLD;
        }
        self.similarity_threshold = self.similarity_threshold.clamp(0.0, 1.0);
        self
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            top_k: self.top_k,
            similarity_threshold: self.similarity_threshold,
        }
    }
}

fn parse_top_k_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
}

// parse optional float env and clamp to <0.0..=1.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn env_parsers_are_lenient() {
        assert_eq!(parse_top_k_env(Some(" 5 ".into())), Some(5));
        assert_eq!(parse_top_k_env(Some("-1".into())), None);
        assert_eq!(parse_top_k_env(None), None);
        assert_eq!(parse_threshold_env(Some("1.7".into())), Some(1.0));
        assert_eq!(parse_threshold_env(Some("0.65".into())), Some(0.65));
        assert_eq!(parse_threshold_env(Some("NaN".into())), None);
        assert_eq!(parse_threshold_env(Some("abc".into())), None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("app.toml");
        fs::write(&p, "top_k = 5\noutput_dir = \"out\"\n").unwrap();
        let cfg = AppConfig::load_from_file(&p).unwrap();
        assert_eq!(cfg.top_k, 5);
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD);
        assert!(cfg.write_metrics);
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_apply_on_top() {
        env::set_var(ENV_TOP_K, "7");
        env::set_var(ENV_SIMILARITY_THRESHOLD, "garbage");
        let cfg = AppConfig::default().with_env_overrides();
        assert_eq!(cfg.top_k, 7);
        assert_eq!(cfg.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD);
        env::remove_var(ENV_TOP_K);
        env::remove_var(ENV_SIMILARITY_THRESHOLD);
    }
}
