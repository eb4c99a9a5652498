use anyhow::{Context, Result};
use std::time::Duration;

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,

    // External APIs
    pub stock_api_key: String,
    pub news_api_key: String,
    pub gemini_api_key: String,
    pub gemini_model: String,

    // Optional host overrides (proxies, local stubs)
    pub alpha_vantage_base_url: Option<String>,
    pub news_api_base_url: Option<String>,
    pub gemini_base_url: Option<String>,

    pub provider_timeout: Duration,
    pub llm_keyword_fallback: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| get(key).with_context(|| format!("{} must be set", key));

        let stock_api_key = get("STOCK_API_KEY")
            .or_else(|| get("ALPHA_VANTAGE_API_KEY"))
            .context("STOCK_API_KEY (or ALPHA_VANTAGE_API_KEY) must be set")?;

        let port = match get("PORT") {
            Some(v) => v.parse().with_context(|| format!("PORT is not a valid port: {}", v))?,
            None => 5000,
        };

        let timeout_secs: u64 = match get("PROVIDER_TIMEOUT_SECS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("PROVIDER_TIMEOUT_SECS is not a number: {}", v))?,
            None => 10,
        };
        if timeout_secs == 0 {
            anyhow::bail!("PROVIDER_TIMEOUT_SECS must be greater than zero");
        }

        let llm_keyword_fallback = get("LLM_KEYWORD_FALLBACK")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            port,
            stock_api_key,
            news_api_key: require("NEWS_API_KEY")?,
            gemini_api_key: require("GEMINI_API_KEY")?,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| llm_client::DEFAULT_GEMINI_MODEL.to_string()),
            alpha_vantage_base_url: get("ALPHA_VANTAGE_BASE_URL"),
            news_api_base_url: get("NEWS_API_BASE_URL"),
            gemini_base_url: get("GEMINI_BASE_URL"),
            provider_timeout: Duration::from_secs(timeout_secs),
            llm_keyword_fallback,
        })
    }
}
