use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

const DEFAULT_MODEL: &str = "o4-mini";
const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables (and a `.env`
/// file when present). Built once at startup and handed to each component.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Model
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,

    // Extraction (headless browser)
    pub chrome_bin: String,
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,
    pub extraction_timeout: Duration,
    pub max_concurrent_browsers: usize,

    // Analysis
    pub analysis_concurrency: usize,

    // Web server
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: DEFAULT_MODEL.to_string(),
            openai_base_url: None,
            chrome_bin: "chromium".to_string(),
            browserless_url: None,
            browserless_token: None,
            extraction_timeout: Duration::from_millis(30_000),
            max_concurrent_browsers: 2,
            analysis_concurrency: 1,
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: DEFAULT_ORIGINS.iter().map(|s| s.to_string()).collect(),
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Load from the process environment. Call `log_keys` once a
    /// subscriber is installed.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let analysis_concurrency: usize = parse_or(&get, "CROSSLENS_ANALYSIS_CONCURRENCY", 1)?;
        let max_concurrent_browsers: usize = parse_or(&get, "CROSSLENS_MAX_BROWSERS", 2)?;
        if analysis_concurrency == 0 || max_concurrent_browsers == 0 {
            return Err(anyhow!(
                "CROSSLENS_ANALYSIS_CONCURRENCY and CROSSLENS_MAX_BROWSERS must be at least 1"
            ));
        }

        let log_format = match get("CROSSLENS_LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(anyhow!("CROSSLENS_LOG_FORMAT must be text or json, got {other}")),
        };

        Ok(Self {
            openai_api_key: get("CROSSLENS_OPENAI_API_KEY"),
            openai_model: get("CROSSLENS_OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: get("CROSSLENS_OPENAI_BASE_URL"),
            chrome_bin: get("CHROME_BIN").unwrap_or(defaults.chrome_bin),
            browserless_url: get("CROSSLENS_BROWSERLESS_URL"),
            browserless_token: get("CROSSLENS_BROWSERLESS_TOKEN"),
            extraction_timeout: Duration::from_millis(parse_or(
                &get,
                "CROSSLENS_EXTRACTION_TIMEOUT_MS",
                30_000u64,
            )?),
            max_concurrent_browsers,
            analysis_concurrency,
            host: get("CROSSLENS_HOST").unwrap_or(defaults.host),
            port: parse_or(&get, "CROSSLENS_PORT", defaults.port)?,
            allowed_origins: get("CROSSLENS_ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.allowed_origins),
            log_format,
        })
    }

    /// Log the loaded settings, secrets as a short preview only.
    pub fn log_keys(&self) {
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) => {
                    let n = v.char_indices().nth(5).map(|(i, _)| i).unwrap_or(v.len());
                    format!("{}...({} chars)", &v[..n], v.len())
                }
                None => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  CROSSLENS_OPENAI_API_KEY: {}", preview_opt(&self.openai_api_key));
        tracing::info!("  CROSSLENS_OPENAI_MODEL: {}", self.openai_model);
        tracing::info!("  CROSSLENS_BROWSERLESS_URL: {}", preview_opt(&self.browserless_url));
        tracing::info!(
            "  extraction timeout: {} ms, browsers: {}, analysis concurrency: {}",
            self.extraction_timeout.as_millis(),
            self.max_concurrent_browsers,
            self.analysis_concurrency
        );
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        None => Ok(default),
    }
}
