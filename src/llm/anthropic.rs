//! Anthropic Messages API client
//!
//! Opens a streamed completion and hands back the raw SSE body. Transient
//! failures are retried while connecting; once bytes flow the stream is
//! passed through untouched.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::client::{ByteStream, LlmClient, api_error_stream};
use super::error::is_retryable_status;
use super::{CompletionRequest, LlmError};
use crate::config::LlmConfig;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Longest server-requested wait honored before retrying a 429
const MAX_RETRY_AFTER_SECS: u64 = 30;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude API client
pub struct AnthropicClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    timeout: Duration,
    initial_backoff: Duration,
}

impl AnthropicClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, base_url = %config.base_url, "from_config: called");
        let api_key = config
            .get_api_key()
            .ok_or_else(|| LlmError::MissingApiKey(config.api_key_env.clone()))?;

        Self::new(config, api_key)
    }

    /// Create a client with an explicit key
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self, LlmError> {
        let timeout = config.timeout();
        let http = Client::builder().connect_timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            max_tokens: config.max_tokens,
            timeout,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    #[cfg(test)]
    fn with_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    /// Build the request body for the Anthropic API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "build_request_body: called");
        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": request.max_tokens.min(self.max_tokens),
            "system": request.system_prompt,
            "messages": request.messages,
            "stream": true,
        });

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(
                request
                    .tools
                    .iter()
                    .map(|t| t.to_anthropic_schema())
                    .collect::<Vec<_>>()
            );
        }

        body
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        self.initial_backoff * 2u32.pow(attempt.saturating_sub(1))
    }

    async fn send(&self, url: &str, body: &serde_json::Value) -> Result<reqwest::Response, LlmError> {
        let pending = self
            .http
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send();

        match tokio::time::timeout(self.timeout, pending).await {
            Ok(result) => result.map_err(LlmError::Network),
            Err(_) => Err(LlmError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn open_stream(&self, request: CompletionRequest) -> Result<ByteStream, LlmError> {
        debug!(%self.model, messages = request.messages.len(), tools = request.tools.len(), "open_stream: called");
        let url = format!("{}/v1/messages", self.base_url);
        let body = self.build_request_body(&request);

        let mut last_error = None;
        let mut wait = Duration::ZERO;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let backoff = self.backoff_for(attempt).max(wait);
                warn!(
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    "open_stream: retrying connection after transient error"
                );
                tokio::time::sleep(backoff).await;
            }
            wait = Duration::ZERO;

            let response = match self.send(&url, &body).await {
                Ok(r) => r,
                Err(e) => {
                    debug!(attempt, error = %e, "open_stream: send failed");
                    if !e.is_retryable() {
                        return Err(e);
                    }
                    last_error = Some(e);
                    continue;
                }
            };

            let status = response.status().as_u16();

            if response.status().is_success() {
                info!(attempt, "open_stream: connected");
                let stream = response
                    .bytes_stream()
                    .map(|chunk| chunk.map(|b| b.to_vec()).map_err(LlmError::Network));
                return Ok(Box::pin(stream));
            }

            if is_retryable_status(status) && attempt < MAX_RETRIES {
                if status == 429 {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(0)
                        .min(MAX_RETRY_AFTER_SECS);
                    wait = Duration::from_secs(retry_after);
                }
                let text = response.text().await.unwrap_or_default();
                debug!(attempt, status, "open_stream: retryable status");
                last_error = Some(LlmError::ApiError { status, message: text });
                continue;
            }

            let text = response.text().await.unwrap_or_default();
            warn!(%status, "open_stream: API error, surfacing as error event");
            return Ok(api_error_stream(status, &text));
        }

        Err(last_error.unwrap_or_else(|| LlmError::InvalidResponse("Max retries exceeded".to_string())))
    }
}
