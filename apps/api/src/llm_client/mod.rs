//! LLM Client: the single point of entry for all chat-completion calls.
//!
//! ARCHITECTURAL RULE: No other module may talk to the model endpoint directly.
//! Orchestrators depend on the `ChatTransport` trait so tests can swap in a mock.
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OPENAI_API_KEY is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    #[error("Request did not complete within {0:?}")]
    Deadline(Duration),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Timeout-class failures are the only ones worth another attempt.
    pub fn is_timeout(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_timeout(),
            LlmError::Timeout { .. } => true,
            _ => false,
        }
    }
}

/// Defaults a request falls back to for every field it does not set.
#[derive(Debug, Clone)]
pub struct LlmDefaults {
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for LlmDefaults {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2000,
            temperature: 0.3,
            timeout: Duration::from_secs(30),
            retries: 2,
            retry_delay: Duration::from_secs(2),
        }
    }
}

/// One system + user prompt pair with optional per-call overrides.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout: Option<Duration>,
    pub retries: Option<u32>,
}

impl ChatRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[cfg(test)]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }
}

/// Sends one chat completion and returns the raw text of the first choice.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if the model produced any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completion client with bearer auth and timeout retries.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    defaults: LlmDefaults,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, defaults: LlmDefaults) -> Self {
        Self {
            client: Client::new(),
            api_key,
            defaults,
        }
    }

    pub fn model(&self) -> &str {
        &self.defaults.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn attempt(
        &self,
        api_key: &str,
        body: &ChatCompletionRequest<'_>,
        timeout: Duration,
    ) -> Result<String, LlmError> {
        let response = self
            .client
            .post(&self.defaults.api_url)
            .bearer_auth(api_key)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        if let Some(usage) = &completion.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        completion
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl ChatTransport for LlmClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let body = ChatCompletionRequest {
            model: request.model.as_deref().unwrap_or(&self.defaults.model),
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: request.max_tokens.unwrap_or(self.defaults.max_tokens),
            temperature: request.temperature.unwrap_or(self.defaults.temperature),
        };
        let timeout = request.timeout.unwrap_or(self.defaults.timeout);
        let retries = request.retries.unwrap_or(self.defaults.retries);

        retry_on_timeout(retries, self.defaults.retry_delay, |_| {
            self.attempt(api_key, &body, timeout)
        })
        .await
    }
}

/// Runs `op` once, then up to `retries` more times while it fails with a
/// timeout-class error, sleeping `delay` between attempts.
///
/// Any other error is returned immediately. Exhausted retries yield
/// `LlmError::Timeout` with the number of attempts made.
pub async fn retry_on_timeout<T, F, Fut>(
    retries: u32,
    delay: Duration,
    mut op: F,
) -> Result<T, LlmError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Err(e) if e.is_timeout() && attempt < retries => {
                attempt += 1;
                warn!(
                    "LLM call timed out ({}), retry {}/{} after {}ms...",
                    e,
                    attempt,
                    retries,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) if e.is_timeout() => {
                return Err(LlmError::Timeout {
                    attempts: attempt + 1,
                })
            }
            other => return other,
        }
    }
}

/// Bounds a whole transport call, retries included.
pub async fn complete_within(
    transport: &dyn ChatTransport,
    request: &ChatRequest,
    deadline: Duration,
) -> Result<String, LlmError> {
    match tokio::time::timeout(deadline, transport.complete(request)).await {
        Ok(result) => result,
        Err(_) => Err(LlmError::Deadline(deadline)),
    }
}
