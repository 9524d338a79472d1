//! The AI reasoning service used by investigation chains and situation narratives.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::errors::ReasoningError;

/// A single completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningPrompt {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ReasoningPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: 800,
            temperature: 0.3,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Text completion backend.
///
/// Implementations classify failures: `ReasoningError::Transient` is retried,
/// `ReasoningError::Permanent` is not.
pub trait ReasoningService: Send + Sync + 'static {
    fn complete(
        &self,
        prompt: &ReasoningPrompt,
    ) -> impl Future<Output = Result<String, ReasoningError>> + Send;
}
