use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::LlmDefaults;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Application configuration loaded from environment variables.
///
/// The API key is optional: without it every model call fails with a
/// configuration error and the orchestrators fall back to their local results.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout: Duration,
    pub retries: u32,
    pub retry_delay: Duration,
    /// Upper bound on a full retry sequence, enforced by the orchestrators.
    pub request_deadline: Duration,
    pub keyword_cache_ttl: Duration,
    pub format_max_chars: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let request_timeout = Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 30)?);
        let retries = parse_env("LLM_RETRIES", 2)?;
        let retry_delay = Duration::from_millis(parse_env("LLM_RETRY_DELAY_MS", 2000)?);
        let default_deadline = retry_budget(request_timeout, retries, retry_delay);

        Ok(Config {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            api_url: std::env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            model: std::env::var("LLM_MODEL")
                .unwrap_or_else(|_| crate::llm_client::DEFAULT_MODEL.to_string()),
            max_tokens: parse_env("LLM_MAX_TOKENS", 2000)?,
            temperature: parse_env("LLM_TEMPERATURE", 0.3)?,
            request_timeout,
            retries,
            retry_delay,
            request_deadline: Duration::from_secs(parse_env(
                "LLM_DEADLINE_SECS",
                default_deadline.as_secs(),
            )?),
            keyword_cache_ttl: Duration::from_secs(parse_env("KEYWORD_CACHE_TTL_SECS", 3600)?),
            format_max_chars: parse_env("FORMAT_MAX_CHARS", 12_000)?,
            port: parse_env("PORT", 3001)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Transport defaults applied to any request that does not override them.
    pub fn llm_defaults(&self) -> LlmDefaults {
        LlmDefaults {
            api_url: self.api_url.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: self.request_timeout,
            retries: self.retries,
            retry_delay: self.retry_delay,
        }
    }
}

/// Worst case for one transport call with all retries, plus one second of slack.
/// The default deadline must not cut the last attempt short.
fn retry_budget(timeout: Duration, retries: u32, delay: Duration) -> Duration {
    timeout * (retries + 1) + delay * retries + Duration::from_secs(1)
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
