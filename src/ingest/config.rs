// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::sources::{SourceDescriptor, SourceRegistry};

pub const ENV_SOURCES_PATH: &str = "HVR_SOURCES_PATH";

/// Load the source registry from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<SourceRegistry> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let items = parse_sources(&content, ext.as_str())
        .with_context(|| format!("parsing sources from {}", path.display()))?;
    Ok(SourceRegistry::from_descriptors(items))
}

/// Load sources using env var + fallbacks:
/// 1) $HVR_SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) built-in seed
pub fn load_sources_default() -> Result<SourceRegistry> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("{ENV_SOURCES_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(SourceRegistry::default_seed())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<SourceDescriptor>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("[[sources]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    // Try JSON: bare array or { "sources": [...] }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    // Fallback: also try TOML if not attempted
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported sources format"))
}

#[derive(serde::Deserialize)]
struct SourcesFile {
    sources: Vec<SourceDescriptor>,
}

fn parse_toml(s: &str) -> Result<Vec<SourceDescriptor>> {
    let v: SourcesFile = toml::from_str(s)?;
    Ok(v.sources)
}

fn parse_json(s: &str) -> Result<Vec<SourceDescriptor>> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum JsonSources {
        List(Vec<SourceDescriptor>),
        Wrapped(SourcesFile),
    }
    let v: JsonSources = serde_json::from_str(s)?;
    Ok(match v {
        JsonSources::List(l) => l,
        JsonSources::Wrapped(w) => w.sources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn toml_and_json_formats_work() {
        let toml = r#"
[[sources]]
name = "WHO News"
credibility = 10
category = "Public Health"
feed_url = "https://who.test/rss"

[[sources]]
name = "Tiny Blog"
"#;
        let json = r#"[{"name":"STAT","credibility":8,"category":"Medical Research","url":"https://stat.test/feed"}]"#;

        let t = parse_sources(toml, "toml").unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t[0].feed_url.as_deref(), Some("https://who.test/rss"));
        assert_eq!(t[1].credibility, 0);
        assert_eq!(t[1].category, "General Health");

        let j = parse_sources(json, "json").unwrap();
        assert_eq!(j[0].name, "STAT");
        assert_eq!(j[0].feed_url.as_deref(), Some("https://stat.test/feed"));

        let wrapped = parse_sources(r#"{"sources":[{"name":"X"}]}"#, "").unwrap();
        assert_eq!(wrapped.len(), 1);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_sources("this is neither", "txt").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        // Isolate CWD in a temp dir so the repo's own config/ does not interfere.
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_SOURCES_PATH);

        // No files → seed
        let v = load_sources_default().unwrap();
        assert_eq!(v.len(), SourceRegistry::default_seed().len());

        // Env wins
        let p_json = tmp.path().join("sources.json");
        fs::write(&p_json, r#"[{"name":"X","credibility":3}]"#).unwrap();
        env::set_var(ENV_SOURCES_PATH, p_json.display().to_string());
        let v2 = load_sources_default().unwrap();
        assert_eq!(v2.len(), 1);
        assert_eq!(v2.get("x").unwrap().credibility, 3);

        // Missing env target is an error
        env::set_var(ENV_SOURCES_PATH, tmp.path().join("nope.toml").display().to_string());
        assert!(load_sources_default().is_err());
        env::remove_var(ENV_SOURCES_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
