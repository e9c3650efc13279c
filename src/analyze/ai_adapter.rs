//! External-service scorer: provider abstraction + file cache + daily limit.
//!
//! `AiScorer` sits behind the same `ViralScorer` seam as the heuristic. It asks
//! a text-generation service for `{"viral_score", "why_viral"}` and falls back
//! to the heuristic whenever the service is disabled, over its daily limit,
//! unreachable, or answers with something unparseable.

use std::fs;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::scoring::{clamp_score, HeuristicScorer, ScoreCard, ViralScorer};
use super::weights::ScoringConfig;
use crate::config::ai::AiConfig;
use crate::ingest::types::Article;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Parsed answer from a text-generation service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiVerdict {
    pub viral_score: u8,
    pub why_viral: String,
}

/// Trait object used by `AiScorer` (and tests).
pub trait AiClient: Send + Sync {
    /// Judge one prompt; `None` means "no usable answer".
    fn judge<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AiVerdict>> + Send + 'a>>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynAiClient = Arc<dyn AiClient>;

/// Factory: build a client according to config and environment variables.
///
/// * If `AI_TEST_MODE=mock`, returns a deterministic mock client.
/// * Else if `config.enabled==false`, returns a disabled client.
/// * Else builds the configured provider wrapped with caching + daily limit.
pub fn build_client_from_config(config: &AiConfig) -> Result<DynAiClient> {
    let cache_dir = config.cache_dir.clone();

    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        let mock = MockProvider::new(r#"{"viral_score": 50, "why_viral": "Neutral hint (mock)"}"#);
        return Ok(Arc::new(CachingClient::new(mock, cache_dir, config.daily_limit)));
    }

    if !config.enabled {
        return Ok(Arc::new(DisabledClient));
    }

    let model = config.model.as_deref();
    match config.provider.as_str() {
        "openai" => {
            let p = OpenAiProvider::new(&config.api_key, model)?;
            Ok(Arc::new(CachingClient::new(p, cache_dir, config.daily_limit)))
        }
        "gemini" => {
            let p = GeminiProvider::new(&config.api_key, model)?;
            Ok(Arc::new(CachingClient::new(p, cache_dir, config.daily_limit)))
        }
        other => {
            warn!(provider = other, "unknown AI provider, AI scoring disabled");
            Ok(Arc::new(DisabledClient))
        }
    }
}

/// Pick the scorer for a run: heuristic unless AI is on (or mocked).
pub fn build_scorer(ai: &AiConfig, scoring: ScoringConfig) -> Result<Box<dyn ViralScorer>> {
    let heuristic = HeuristicScorer::new(scoring)?;
    let mocked = std::env::var("AI_TEST_MODE").is_ok_and(|v| v == "mock");
    if !(ai.enabled || mocked) {
        return Ok(Box::new(heuristic));
    }
    let client = build_client_from_config(ai)?;
    Ok(Box::new(AiScorer::new(client, heuristic)))
}

// ------------------------------------------------------------
// Scorer
// ------------------------------------------------------------

pub struct AiScorer {
    client: DynAiClient,
    fallback: HeuristicScorer,
}

impl AiScorer {
    pub fn new(client: DynAiClient, fallback: HeuristicScorer) -> Self {
        Self { client, fallback }
    }

    /// Card built from the service's verdict, or `None` when it has no usable answer.
    async fn verdict_card(&self, article: &Article, now: i64) -> Option<ScoreCard> {
        let prompt = build_prompt(article, now);
        let v = self.client.judge(&prompt).await?;
        let reason = sanitize_reason(&v.why_viral);
        let rationale = if reason.is_empty() {
            vec![self.fallback.config().rationale.fallback.clone()]
        } else {
            vec![reason]
        };
        Some(ScoreCard {
            score: v.viral_score.min(100),
            rationale,
            breakdown: Vec::new(),
        })
    }
}

#[async_trait]
impl ViralScorer for AiScorer {
    async fn score(&self, article: &Article, now: i64) -> ScoreCard {
        match self.verdict_card(article, now).await {
            Some(card) => card,
            None => {
                debug!(provider = self.client.provider_name(), "no AI verdict, using heuristic");
                self.fallback.evaluate(article, now)
            }
        }
    }

    /// All-or-nothing: the first missing verdict (daily limit, outage, bad
    /// answer) drops the whole batch to the heuristic, so service scores
    /// and heuristic scores never meet in one ranking.
    async fn score_batch(&self, articles: &[Article], now: i64) -> Vec<ScoreCard> {
        let mut cards = Vec::with_capacity(articles.len());
        for article in articles {
            match self.verdict_card(article, now).await {
                Some(card) => cards.push(card),
                None => {
                    warn!(
                        provider = self.client.provider_name(),
                        answered = cards.len(),
                        total = articles.len(),
                        "AI scoring incomplete, scoring the batch with the heuristic"
                    );
                    return articles
                        .iter()
                        .map(|a| self.fallback.evaluate(a, now))
                        .collect();
                }
            }
        }
        cards
    }

    fn name(&self) -> &'static str {
        "ai"
    }
}

/// Prompt for one article. Deterministic for a given `(article, now)` so the
/// file cache can key on it.
pub fn build_prompt(article: &Article, now: i64) -> String {
    let today = chrono::DateTime::from_timestamp(now, 0)
        .map(|d| d.format("%B %d, %Y").to_string())
        .unwrap_or_default();
    let published = article
        .published_at
        .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
        .map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "Today is {today}.\n\
         Rate the viral potential of this health article for social media on a 0-100 scale.\n\
         Consider shareability (surprising, controversial, actionable), novelty, emotional impact, \
         recency and source credibility.\n\n\
         Title: {title}\nSummary: {summary}\nSource: {source} (credibility {cred}/10, {category})\n\
         Published: {published}\n\n\
         Return ONLY a JSON object: {{\"viral_score\": <0-100>, \"why_viral\": \"<one short sentence>\"}}. \
         No markdown.",
        title = article.title,
        summary = article.summary,
        source = article.source.name,
        cred = article.source.credibility,
        category = article.source.category,
    )
}

/// Parse model output: a JSON object, or the first element of a JSON array,
/// optionally wrapped in a ```json fence.
pub fn parse_verdict(raw: &str) -> Option<AiVerdict> {
    #[derive(Deserialize)]
    struct Loose {
        viral_score: f64,
        #[serde(default)]
        why_viral: String,
    }

    let body = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let obj = match value {
        serde_json::Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        v @ serde_json::Value::Object(_) => v,
        _ => return None,
    };
    let loose: Loose = serde_json::from_value(obj).ok()?;
    if !loose.viral_score.is_finite() {
        return None;
    }
    Some(AiVerdict {
        viral_score: clamp_score(loose.viral_score.round() as i32),
        why_viral: loose.why_viral,
    })
}

// ------------------------------------------------------------
// Provider abstraction + concrete providers
// ------------------------------------------------------------

/// Low-level provider: does a *real* remote call and returns raw model text.
/// Separated so the same caching wrapper serves production and tests.
pub trait Provider: Send + Sync + 'static {
    fn fetch<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("health-viral-ranker/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(20))
        .build()
        .context("building AI http client")
}

/// OpenAI provider (Chat Completions API).
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    /// `model`: defaults to gpt-4o-mini.
    pub fn new(api_key: &str, model: Option<&str>) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            api_key: api_key.to_string(),
            model: model.unwrap_or("gpt-4o-mini").to_string(),
        })
    }
}

impl Provider for OpenAiProvider {
    fn fetch<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Msg<'a> {
                role: &'a str,
                content: &'a str,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                model: &'a str,
                messages: Vec<Msg<'a>>,
                temperature: f32,
                max_tokens: u32,
            }
            #[derive(Deserialize)]
            struct Resp {
                choices: Vec<Choice>,
            }
            #[derive(Deserialize)]
            struct Choice {
                message: ChoiceMsg,
            }
            #[derive(Deserialize)]
            struct ChoiceMsg {
                content: String,
            }

            let sys = "You evaluate health news for social media virality. Answer with JSON only.";
            let req = Req {
                model: &self.model,
                messages: vec![
                    Msg {
                        role: "system",
                        content: sys,
                    },
                    Msg {
                        role: "user",
                        content: prompt,
                    },
                ],
                temperature: 0.2,
                max_tokens: 120,
            };

            let resp = self
                .http
                .post("https://api.openai.com/v1/chat/completions")
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await
                .map_err(|e| warn!(error = ?e, "openai request failed"))
                .ok()?;

            if !resp.status().is_success() {
                warn!(status = %resp.status(), "openai non-success status");
                return None;
            }
            let body: Resp = resp.json().await.ok()?;
            body.choices.into_iter().next().map(|c| c.message.content)
        })
    }
    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Google Gemini provider (generateContent API).
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    /// `model`: defaults to gemini-1.5-flash-latest.
    pub fn new(api_key: &str, model: Option<&str>) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            api_key: api_key.to_string(),
            model: model.unwrap_or("gemini-1.5-flash-latest").to_string(),
        })
    }
}

impl Provider for GeminiProvider {
    fn fetch<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Part<'a> {
                text: &'a str,
            }
            #[derive(Serialize)]
            struct Content<'a> {
                parts: Vec<Part<'a>>,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                contents: Vec<Content<'a>>,
            }
            #[derive(Deserialize)]
            struct Resp {
                #[serde(default)]
                candidates: Vec<Candidate>,
            }
            #[derive(Deserialize)]
            struct Candidate {
                content: RespContent,
            }
            #[derive(Deserialize)]
            struct RespContent {
                #[serde(default)]
                parts: Vec<RespPart>,
            }
            #[derive(Deserialize)]
            struct RespPart {
                #[serde(default)]
                text: String,
            }

            let url = format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                self.model
            );
            let req = Req {
                contents: vec![Content {
                    parts: vec![Part { text: prompt }],
                }],
            };

            let resp = self
                .http
                .post(url)
                .query(&[("key", self.api_key.as_str())])
                .json(&req)
                .send()
                .await
                .map_err(|e| warn!(error = ?e, "gemini request failed"))
                .ok()?;

            if !resp.status().is_success() {
                warn!(status = %resp.status(), "gemini non-success status");
                return None;
            }
            let body: Resp = resp.json().await.ok()?;
            let text: String = body
                .candidates
                .into_iter()
                .next()?
                .content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect();
            (!text.trim().is_empty()).then_some(text)
        })
    }
    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Returns `None` always; used when AI is disabled.
pub struct DisabledClient;

impl AiClient for DisabledClient {
    fn judge<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AiVerdict>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed-answer provider for tests/local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: String,
}

impl MockProvider {
    pub fn new(fixed: &str) -> Self {
        Self {
            fixed: fixed.to_string(),
        }
    }
}

impl Provider for MockProvider {
    fn fetch<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Some(out) })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

// ------------------------------------------------------------
// Caching client wrapper (file cache + daily limit)
// ------------------------------------------------------------

/// Counter state is guarded by a `Mutex`; cache files are written via rename.
pub struct CachingClient<P: Provider> {
    inner: P,
    cache_dir: PathBuf,
    daily_limit_max: u32,
    counter: Arc<Mutex<DailyCounter>>,
}

impl<P: Provider> CachingClient<P> {
    pub fn new(inner: P, cache_dir: PathBuf, daily_limit_max: u32) -> Self {
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            warn!(error = ?e, dir = %cache_dir.display(), "cannot create AI cache dir");
        }
        let counter = Arc::new(Mutex::new(
            load_daily_counter(&cache_dir).unwrap_or_default(),
        ));
        Self {
            inner,
            cache_dir,
            daily_limit_max,
            counter,
        }
    }

    async fn judge_impl(&self, prompt: &str) -> Option<AiVerdict> {
        // 1) Cache lookup; hits do not count against the limit.
        let key = cache_key(prompt);
        if let Some(hit) = read_cache_file(&self.cache_dir, &key) {
            return Some(hit);
        }

        // 2) Daily limit.
        {
            let mut g = self.counter.lock().ok()?;
            if g.is_expired() {
                g.reset_to_today();
                let _ = save_daily_counter(&self.cache_dir, &g);
            }
            if g.count >= self.daily_limit_max {
                debug!(limit = self.daily_limit_max, "AI daily limit reached");
                return None;
            }
        }

        // 3) Real call.
        let raw = self.inner.fetch(prompt).await?;
        let verdict = parse_verdict(&raw)?;
        if let Err(e) = write_cache_file(&self.cache_dir, &key, &verdict) {
            debug!(error = ?e, "AI cache write failed");
        }
        let mut g = self.counter.lock().ok()?;
        g.count = g.count.saturating_add(1);
        let _ = save_daily_counter(&self.cache_dir, &g);
        Some(verdict)
    }

    /// Real calls made today (cache hits excluded).
    pub fn calls_today(&self) -> u32 {
        self.counter.lock().map(|g| g.count).unwrap_or(0)
    }
}

impl<P: Provider> AiClient for CachingClient<P> {
    fn judge<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AiVerdict>> + Send + 'a>> {
        Box::pin(self.judge_impl(prompt))
    }
    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

// ------------------------------------------------------------
// File cache helpers
// ------------------------------------------------------------

fn cache_key(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut out = String::with_capacity(32);
    for b in digest.iter().take(16) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn cache_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

fn read_cache_file(dir: &Path, key: &str) -> Option<AiVerdict> {
    let s = fs::read_to_string(cache_path(dir, key)).ok()?;
    serde_json::from_str(&s).ok()
}

fn write_cache_file(dir: &Path, key: &str, value: &AiVerdict) -> io::Result<()> {
    let path = cache_path(dir, key);
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(value)?;
    let mut f = fs::File::create(&tmp)?;
    f.write_all(json.as_bytes())?;
    fs::rename(tmp, path)?;
    Ok(())
}

// ------------------------------------------------------------
// Daily counter helpers
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DailyCounter {
    date: String,
    count: u32,
}
impl Default for DailyCounter {
    fn default() -> Self {
        Self {
            date: today(),
            count: 0,
        }
    }
}
impl DailyCounter {
    fn is_expired(&self) -> bool {
        self.date != today()
    }
    fn reset_to_today(&mut self) {
        self.date = today();
        self.count = 0;
    }
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

fn counter_path(dir: &Path) -> PathBuf {
    dir.join("daily_count.json")
}

fn load_daily_counter(dir: &Path) -> io::Result<DailyCounter> {
    let s = fs::read_to_string(counter_path(dir))?;
    serde_json::from_str(&s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn save_daily_counter(dir: &Path, dc: &DailyCounter) -> io::Result<()> {
    let p = counter_path(dir);
    let tmp = p.with_extension("json.tmp");
    let s = serde_json::to_string(dc)?;
    let mut f = fs::File::create(&tmp)?;
    f.write_all(s.as_bytes())?;
    fs::rename(tmp, p)?;
    Ok(())
}

// ------------------------------------------------------------
// Sanitization
// ------------------------------------------------------------

/// Ensure ASCII-only, single line, and <=160 chars. Collapses whitespace.
pub fn sanitize_reason(input: &str) -> String {
    let mut out = String::with_capacity(160);
    let mut prev_space = false;
    for ch in input.chars() {
        let c = match ch {
            '\r' | '\n' | '\t' => ' ',
            c if c.is_ascii() => c,
            _ => ' ',
        };
        if c == ' ' {
            if !prev_space && !out.is_empty() {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
        if out.len() >= 160 {
            break;
        }
    }
    out.trim().to_string()
}
