//! HTTP reasoning client for a messages-style completion endpoint.
//!
//! One request per call; retries and per-step timeouts belong to the chain
//! orchestrator. Client errors (4xx other than 408 and 429) are permanent,
//! everything else is transient.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use sentinel_core::config::ReasoningConfig;
use sentinel_core::errors::ReasoningError;
use sentinel_core::traits::{ReasoningPrompt, ReasoningService};

const DEFAULT_MODEL: &str = "reasoning-default";
const API_VERSION: &str = "2023-06-01";

/// Connection settings for [`HttpReasoningClient`].
#[derive(Debug, Clone)]
pub struct ReasoningClientConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Transport timeout. The orchestrator's step timeout is usually shorter.
    pub request_timeout: Duration,
}

impl ReasoningClientConfig {
    /// Resolve from configuration; the API key is read from the environment
    /// variable named by `reasoning.api_key_env`.
    pub fn from_config(config: &ReasoningConfig) -> Result<Self, ReasoningError> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or(ReasoningError::NotConfigured)?;
        Ok(Self {
            endpoint,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: std::env::var(config.effective_api_key_env()).ok(),
            request_timeout: Duration::from_millis(config.effective_step_timeout_ms()),
        })
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone)]
pub struct HttpReasoningClient {
    config: ReasoningClientConfig,
    client: reqwest::Client,
}

impl HttpReasoningClient {
    pub fn new(config: ReasoningClientConfig) -> Result<Self, ReasoningError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .gzip(true)
            .build()
            .map_err(|e| ReasoningError::Permanent(format!("client build failed: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn from_config(config: &ReasoningConfig) -> Result<Self, ReasoningError> {
        Self::new(ReasoningClientConfig::from_config(config)?)
    }

    async fn send(&self, prompt: &ReasoningPrompt) -> Result<String, ReasoningError> {
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: prompt.max_tokens,
            temperature: prompt.temperature,
            system: &prompt.system,
            messages: [Message {
                role: "user",
                content: &prompt.user,
            }],
        };
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .header("anthropic-version", API_VERSION)
            .json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &text));
        }
        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ReasoningError::Permanent(format!("invalid response body: {e}")))?;
        Ok(parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn transport_error(&self, e: reqwest::Error) -> ReasoningError {
        if e.is_timeout() {
            ReasoningError::Timeout {
                timeout_ms: self.config.request_timeout.as_millis() as u64,
            }
        } else {
            ReasoningError::Transient(e.to_string())
        }
    }
}

impl ReasoningService for HttpReasoningClient {
    async fn complete(&self, prompt: &ReasoningPrompt) -> Result<String, ReasoningError> {
        let result = self.send(prompt).await;
        if let Err(e) = &result {
            tracing::debug!(endpoint = %self.config.endpoint, error = %e, "reasoning request failed");
        }
        result
    }
}

pub(crate) fn classify_status(status: StatusCode, body: &str) -> ReasoningError {
    let message = format!("HTTP {status}: {}", body.chars().take(200).collect::<String>());
    let retryable_client_error =
        status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::TOO_MANY_REQUESTS;
    if status.is_client_error() && !retryable_client_error {
        ReasoningError::Permanent(message)
    } else {
        ReasoningError::Transient(message)
    }
}
