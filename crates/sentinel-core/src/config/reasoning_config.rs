//! Reasoning chain configuration.

use serde::{Deserialize, Serialize};

/// How the running confidence of a chain is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfidencePolicy {
    /// The most recent completed step's confidence.
    #[default]
    Latest,
    /// Mean over completed steps.
    Mean,
}

/// Configuration for the reasoning orchestrator and its HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReasoningConfig {
    /// Run investigations at all. Default: true.
    pub enabled: Option<bool>,
    pub confidence_policy: Option<ConfidencePolicy>,
    /// Running confidence below which a chain bails out. Default: 20.
    pub bailout_confidence: Option<u8>,
    /// Retries per step after the first attempt. Default: 2.
    pub max_retries: Option<u32>,
    /// Initial retry backoff. Default: 500ms.
    pub initial_backoff_ms: Option<u64>,
    /// Backoff ceiling. Default: 8000ms.
    pub max_backoff_ms: Option<u64>,
    /// Per-step timeout. Default: 30000ms.
    pub step_timeout_ms: Option<u64>,
    /// Chains running at once. Default: 4.
    pub max_concurrent_chains: Option<usize>,
    /// Days of prior alerts offered as precedent. Default: 30.
    pub precedent_days: Option<u32>,
    /// Reasoning service endpoint for the HTTP client.
    pub endpoint: Option<String>,
    /// Model name sent to the reasoning service.
    pub model: Option<String>,
    /// Environment variable holding the API key. Default: SENTINEL_REASONING_API_KEY.
    pub api_key_env: Option<String>,
}

impl ReasoningConfig {
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn effective_confidence_policy(&self) -> ConfidencePolicy {
        self.confidence_policy.unwrap_or_default()
    }

    pub fn effective_bailout_confidence(&self) -> u8 {
        self.bailout_confidence
            .unwrap_or(crate::constants::BAILOUT_CONFIDENCE)
    }

    pub fn effective_max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(2)
    }

    pub fn effective_initial_backoff_ms(&self) -> u64 {
        self.initial_backoff_ms.unwrap_or(500)
    }

    pub fn effective_max_backoff_ms(&self) -> u64 {
        self.max_backoff_ms.unwrap_or(8_000)
    }

    pub fn effective_step_timeout_ms(&self) -> u64 {
        self.step_timeout_ms.unwrap_or(30_000)
    }

    pub fn effective_max_concurrent_chains(&self) -> usize {
        self.max_concurrent_chains.unwrap_or(4).max(1)
    }

    pub fn effective_precedent_days(&self) -> u32 {
        self.precedent_days.unwrap_or(30)
    }

    pub fn effective_api_key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or("SENTINEL_REASONING_API_KEY")
    }
}
