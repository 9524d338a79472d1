//! The investigation state machine.
//!
//! A chain walks its plan one step at a time. Each step is one completion
//! call wrapped in a timeout and retried with exponential backoff. The chain
//! ends early on bailout (running confidence below the line before the
//! scoring step), on cancellation, or when the first step cannot complete.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use sentinel_core::config::{ConfidencePolicy, ReasoningConfig};
use sentinel_core::errors::ReasoningError;
use sentinel_core::traits::{Cancellable, CancellationToken, ReasoningPrompt, ReasoningService};
use sentinel_core::types::{
    AlertStatus, ChainStatus, Investigation, Recommendation, StepKind, StepResult, StepStatus,
};

use super::frameworks::{select_frameworks, Framework};
use super::parse;
use super::plan::plan_for;
use super::prompts::{build_prompt, ChainContext};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainPolicy {
    pub bailout_confidence: u8,
    pub confidence_policy: ConfidencePolicy,
    /// Attempts after the first.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub step_timeout: Duration,
    pub max_concurrent_chains: usize,
    pub precedent_days: u32,
}

impl Default for ChainPolicy {
    fn default() -> Self {
        Self::from_config(&ReasoningConfig::default())
    }
}

impl ChainPolicy {
    pub fn from_config(config: &ReasoningConfig) -> Self {
        Self {
            bailout_confidence: config.effective_bailout_confidence(),
            confidence_policy: config.effective_confidence_policy(),
            max_retries: config.effective_max_retries(),
            initial_backoff: Duration::from_millis(config.effective_initial_backoff_ms()),
            max_backoff: Duration::from_millis(config.effective_max_backoff_ms()),
            step_timeout: Duration::from_millis(config.effective_step_timeout_ms()),
            max_concurrent_chains: config.effective_max_concurrent_chains(),
            precedent_days: config.effective_precedent_days(),
        }
    }
}

/// Alert status implied by how its chain ended.
pub fn alert_status_for(investigation: &Investigation) -> AlertStatus {
    match investigation.chain_status {
        ChainStatus::Complete | ChainStatus::Partial => AlertStatus::Investigated,
        ChainStatus::Bailout => AlertStatus::Bailout,
        ChainStatus::Incomplete => AlertStatus::Open,
    }
}

/// Runs investigation chains against a [`ReasoningService`], at most
/// `max_concurrent_chains` at a time.
pub struct ChainOrchestrator<S> {
    service: Arc<S>,
    policy: ChainPolicy,
    permits: Arc<Semaphore>,
}

impl<S> Clone for ChainOrchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            policy: self.policy,
            permits: Arc::clone(&self.permits),
        }
    }
}

impl<S: ReasoningService> ChainOrchestrator<S> {
    pub fn new(service: Arc<S>, policy: ChainPolicy) -> Self {
        let permits = Arc::new(Semaphore::new(policy.max_concurrent_chains.max(1)));
        Self {
            service,
            policy,
            permits,
        }
    }

    pub fn policy(&self) -> &ChainPolicy {
        &self.policy
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    /// Investigate every context concurrently. Results line up with the
    /// input; a chain whose task panicked comes back incomplete.
    pub async fn investigate_all(
        &self,
        contexts: Vec<ChainContext>,
        cancel: &CancellationToken,
    ) -> Vec<Investigation> {
        let titles: Vec<String> = contexts.iter().map(|c| c.alert.title.clone()).collect();
        let mut results: Vec<Option<Investigation>> = vec![None; contexts.len()];
        let mut tasks = JoinSet::new();
        for (index, ctx) in contexts.into_iter().enumerate() {
            let orchestrator = self.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move { (index, orchestrator.investigate(&ctx, &cancel).await) });
        }
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, investigation)) => results[index] = Some(investigation),
                Err(e) => tracing::error!(error = %e, "investigation task failed"),
            }
        }
        results
            .into_iter()
            .zip(titles)
            .map(|(result, title)| result.unwrap_or_else(|| incomplete(title, Vec::new())))
            .collect()
    }

    /// Run the plan for one alert.
    pub async fn investigate(&self, ctx: &ChainContext, cancel: &CancellationToken) -> Investigation {
        // The semaphore is never closed, so a failed acquire only skips the bound.
        let _permit = Arc::clone(&self.permits).acquire_owned().await.ok();
        let alert_id = ctx.alert.id.as_str();
        let plan = plan_for(ctx.alert.detector_type);
        let frameworks: Vec<&'static Framework> = if plan.contains(&StepKind::StrategicImplications) {
            select_frameworks(&ctx.framework_text())
        } else {
            Vec::new()
        };

        let mut steps: Vec<StepResult> = Vec::with_capacity(plan.len());
        let mut bailed_out = false;
        let mut cancelled = false;

        for &kind in plan {
            if cancel.is_cancelled() {
                tracing::info!(alert_id, step = kind.as_str(), "chain cancelled");
                cancelled = true;
                break;
            }
            let prompt = build_prompt(kind, ctx, &steps, &frameworks, self.policy.precedent_days);
            match self.run_step(&prompt, alert_id, kind).await {
                Ok((text, attempts)) => {
                    steps.push(completed_step(kind, text, attempts, &frameworks));
                    if kind != StepKind::ConfidenceScoring {
                        let running = running_confidence(&steps, self.policy.confidence_policy);
                        if running < self.policy.bailout_confidence {
                            tracing::warn!(
                                alert_id,
                                step = kind.as_str(),
                                running_confidence = running,
                                "chain bailed out on low confidence"
                            );
                            bailed_out = true;
                            break;
                        }
                    }
                }
                Err((error, attempts)) => {
                    tracing::warn!(
                        alert_id,
                        step = kind.as_str(),
                        attempts,
                        error = %error,
                        "chain step failed"
                    );
                    steps.push(failed_step(kind, &error, attempts));
                    if !steps.iter().any(StepResult::is_completed) {
                        break;
                    }
                }
            }
        }

        let investigation = conclude(&ctx.alert.title, steps, bailed_out, cancelled);
        tracing::info!(
            alert_id,
            chain_status = investigation.chain_status.as_str(),
            overall_confidence = investigation.overall_confidence,
            recommendation = investigation.recommendation.as_str(),
            steps = investigation.steps.len(),
            "investigation finished"
        );
        investigation
    }

    /// One step with timeout and retries. Returns the text and the number of
    /// attempts made.
    async fn run_step(
        &self,
        prompt: &ReasoningPrompt,
        alert_id: &str,
        kind: StepKind,
    ) -> Result<(String, u32), (ReasoningError, u32)> {
        let timeout_ms = self.policy.step_timeout.as_millis() as u64;
        let mut backoff = self.policy.initial_backoff;
        let mut attempts = 0;
        let mut last_error = ReasoningError::Transient("no attempt made".to_string());

        for attempt in 0..=self.policy.max_retries {
            if attempt > 0 {
                tracing::debug!(
                    alert_id,
                    step = kind.as_str(),
                    attempt,
                    max_retries = self.policy.max_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    "retrying chain step"
                );
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(self.policy.max_backoff);
            }
            attempts += 1;
            let outcome =
                tokio::time::timeout(self.policy.step_timeout, self.service.complete(prompt)).await;
            match outcome {
                Ok(Ok(text)) if !text.trim().is_empty() => return Ok((text.trim().to_string(), attempts)),
                Ok(Ok(_)) => last_error = ReasoningError::Transient("empty response".to_string()),
                Ok(Err(e)) if !e.is_retryable() => return Err((e, attempts)),
                Ok(Err(e)) => last_error = e,
                Err(_) => last_error = ReasoningError::Timeout { timeout_ms },
            }
        }
        Err((last_error, attempts))
    }
}

// ─── Step results ───────────────────────────────────────────────────────────

fn completed_step(kind: StepKind, text: String, attempts: u32, frameworks: &[&Framework]) -> StepResult {
    let confidence = match kind {
        StepKind::ConfidenceScoring => parse::parse_overall_confidence(&text),
        _ => parse::parse_confidence(&text),
    };
    let likely_causes = match kind {
        StepKind::CausalAnalysis => parse::parse_causes(&text),
        _ => Vec::new(),
    };
    let (recommended_actions, framework_keys) = match kind {
        StepKind::StrategicImplications => (
            parse::parse_actions(&text),
            frameworks.iter().map(|f| f.key.to_string()).collect(),
        ),
        _ => (Vec::new(), Vec::new()),
    };
    StepResult {
        kind,
        status: StepStatus::Completed,
        content: text,
        confidence,
        attempts,
        likely_causes,
        recommended_actions,
        frameworks: framework_keys,
        error: None,
    }
}

fn failed_step(kind: StepKind, error: &ReasoningError, attempts: u32) -> StepResult {
    StepResult {
        kind,
        status: StepStatus::Failed,
        content: String::new(),
        confidence: 0,
        attempts,
        likely_causes: Vec::new(),
        recommended_actions: Vec::new(),
        frameworks: Vec::new(),
        error: Some(error.to_string()),
    }
}

/// Running confidence over completed steps; 0 when none completed.
pub fn running_confidence(steps: &[StepResult], policy: ConfidencePolicy) -> u8 {
    let completed: Vec<u8> = steps
        .iter()
        .filter(|s| s.is_completed())
        .map(|s| s.confidence)
        .collect();
    match policy {
        ConfidencePolicy::Latest => completed.last().copied().unwrap_or(0),
        ConfidencePolicy::Mean => mean_confidence(&completed).unwrap_or(0),
    }
}

fn mean_confidence(values: &[u8]) -> Option<u8> {
    if values.is_empty() {
        return None;
    }
    let sum: u32 = values.iter().map(|&v| v as u32).sum();
    Some((sum as f64 / values.len() as f64).round() as u8)
}

fn summary_for(title: &str, recommendation: Recommendation) -> String {
    match recommendation {
        Recommendation::ActNow => format!("{title} (immediate action recommended)"),
        Recommendation::InvestigateFurther => format!("{title} (further investigation needed)"),
        Recommendation::Monitor => title.to_string(),
    }
}

fn incomplete(title: String, steps: Vec<StepResult>) -> Investigation {
    Investigation {
        steps,
        chain_status: ChainStatus::Incomplete,
        overall_confidence: None,
        recommendation: Recommendation::Monitor,
        summary: title,
    }
}

fn conclude(title: &str, steps: Vec<StepResult>, bailed_out: bool, cancelled: bool) -> Investigation {
    let completed: Vec<&StepResult> = steps.iter().filter(|s| s.is_completed()).collect();
    if completed.is_empty() {
        return incomplete(title.to_string(), steps);
    }

    let scoring = completed
        .iter()
        .find(|s| s.kind == StepKind::ConfidenceScoring);
    let (overall, recommendation) = match scoring {
        Some(step) => (step.confidence, parse::parse_recommendation(&step.content)),
        None => {
            let values: Vec<u8> = completed.iter().map(|s| s.confidence).collect();
            (
                mean_confidence(&values).unwrap_or(parse::DEFAULT_OVERALL_CONFIDENCE),
                Recommendation::Monitor,
            )
        }
    };

    let chain_status = if bailed_out {
        ChainStatus::Bailout
    } else if cancelled || completed.len() < steps.len() {
        ChainStatus::Partial
    } else {
        ChainStatus::Complete
    };

    Investigation {
        summary: summary_for(title, recommendation),
        steps,
        chain_status,
        overall_confidence: Some(overall),
        recommendation,
    }
}
