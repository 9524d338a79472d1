//! Step prompts for investigation chains.

use sentinel_core::traits::ReasoningPrompt;
use sentinel_core::types::{Alert, StepKind, StepResult};

use super::frameworks::{framework_prompt, Framework};

const SYSTEM_PROMPT: &str = "You are an intelligence analyst for a brand strategy team. \
You investigate automated alerts about news, social conversation and markets. \
Be specific, cite the numbers you are given, and never invent data.";

const MAX_PRECEDENTS: usize = 10;

/// Everything a chain knows about its alert besides the step transcript.
#[derive(Debug, Clone)]
pub struct ChainContext {
    pub alert: Alert,
    /// Earlier alerts of the same type and scope, newest first.
    pub precedents: Vec<Alert>,
    /// Titles of other alerts raised in the same cycle.
    pub cycle_peers: Vec<String>,
}

impl ChainContext {
    pub fn new(alert: Alert) -> Self {
        Self {
            alert,
            precedents: Vec::new(),
            cycle_peers: Vec::new(),
        }
    }

    pub fn with_precedents(mut self, precedents: Vec<Alert>) -> Self {
        self.precedents = precedents;
        self
    }

    pub fn with_cycle_peers(mut self, peers: Vec<String>) -> Self {
        self.cycle_peers = peers;
        self
    }

    /// Text used to choose strategic frameworks.
    pub fn framework_text(&self) -> String {
        format!(
            "{} {} {}",
            self.alert.title,
            self.alert.summary,
            self.alert.detector_type.as_str()
        )
    }
}

fn alert_block(alert: &Alert) -> String {
    let mut text = format!(
        "ALERT:\n- Type: {}\n- Scope: {}\n- Severity: {}\n- Title: {}\n- Summary: {}\n",
        alert.detector_type.as_str(),
        alert.scope,
        alert.severity.as_str(),
        alert.title,
        alert.summary
    );
    if !alert.raw_metric_values.is_empty() {
        text.push_str("\nDATA:\n");
        for (name, value) in &alert.raw_metric_values {
            text.push_str(&format!("- {name}: {value:.4}\n"));
        }
    }
    text
}

fn peers_block(ctx: &ChainContext) -> String {
    if ctx.cycle_peers.is_empty() {
        return String::new();
    }
    let mut text = String::from("\nOTHER SIGNALS THIS CYCLE:\n");
    for title in &ctx.cycle_peers {
        text.push_str(&format!("- {title}\n"));
    }
    text
}

/// Completed steps so far, as `[Title]: content` paragraphs.
fn transcript(prior: &[StepResult]) -> String {
    let parts: Vec<String> = prior
        .iter()
        .filter(|s| s.is_completed())
        .map(|s| format!("[{}]: {}", s.kind.title(), s.content))
        .collect();
    if parts.is_empty() {
        "(none)".to_string()
    } else {
        parts.join("\n\n")
    }
}

fn precedent_block(ctx: &ChainContext, days: u32) -> String {
    if ctx.precedents.is_empty() {
        return format!("No similar alerts found in the past {days} days.");
    }
    let mut text = format!("Similar alerts in the past {days} days:\n");
    for alert in ctx.precedents.iter().take(MAX_PRECEDENTS) {
        text.push_str(&format!(
            "- [{}] {} ({})\n",
            alert.created_at.format("%Y-%m-%d"),
            alert.title,
            alert.status.as_str()
        ));
    }
    text
}

const CONFIDENCE_FOOTER: &str = "End with: Confidence: [0.0-1.0]";

/// Prompt for one step given the chain context and the steps already run.
pub fn build_prompt(
    kind: StepKind,
    ctx: &ChainContext,
    prior: &[StepResult],
    frameworks: &[&Framework],
    precedent_days: u32,
) -> ReasoningPrompt {
    let user = match kind {
        StepKind::SituationAssessment => {
            let about = ctx
                .alert
                .scope
                .name()
                .map(|n| format!(" about {n}"))
                .unwrap_or_default();
            format!(
                "Provide a concise SITUATION ASSESSMENT{about}.\n\n{}{}\n\
                 Provide exactly:\n\
                 1. What is happening? (2-3 sentences)\n\
                 2. How significant are the numbers? (1 sentence)\n\
                 3. Is this new or a continuation? (1 sentence)\n\n{CONFIDENCE_FOOTER}",
                alert_block(&ctx.alert),
                peers_block(ctx)
            )
        }
        StepKind::HistoricalContext => format!(
            "Provide HISTORICAL CONTEXT for this alert.\n\nPRIOR ANALYSIS:\n{}\n\n\
             HISTORICAL DATA:\n{}\n\
             Has this pattern occurred before? If so, what happened next?\n\
             Did the outcome matter or did it normalize?\n\
             Assess whether this follows precedent or is something new.\n\n{CONFIDENCE_FOOTER}",
            transcript(prior),
            precedent_block(ctx, precedent_days)
        ),
        StepKind::CausalAnalysis => format!(
            "Provide CAUSAL ANALYSIS.\n\nPRIOR ANALYSIS:\n{}\n\nSUPPORTING DATA:\n{}{}\n\
             Why is this happening? Identify 2-3 likely causes and cite data points.\n\n\
             Format:\n\
             1. Primary cause: [explanation]\n\
             2. Contributing factor: [explanation]\n\
             3. Additional context: [explanation]\n\n{CONFIDENCE_FOOTER}",
            transcript(prior),
            alert_block(&ctx.alert),
            peers_block(ctx)
        ),
        StepKind::StrategicImplications => format!(
            "Provide STRATEGIC IMPLICATIONS.\n\nPRIOR ANALYSIS:\n{}\n\n{}\n\n\
             Based on the situation, history and causes identified:\n\
             1. What are the strategic implications? (2-3 sentences)\n\
             2. What specific actions should be taken? (2-3 bullet points starting with \"-\")\n\
             3. Which frameworks apply best and why? (1-2 sentences)\n\n{CONFIDENCE_FOOTER}",
            transcript(prior),
            framework_prompt(frameworks)
        ),
        StepKind::ConfidenceScoring => {
            let scores: Vec<String> = prior
                .iter()
                .filter(|s| s.is_completed())
                .map(|s| format!("- {}: {}", s.kind.title(), s.confidence))
                .collect();
            format!(
                "Provide a CONFIDENCE ASSESSMENT.\n\nPRIOR ANALYSIS:\n{}\n\n\
                 Step confidences so far (0-100):\n{}\n\n\
                 Score your overall confidence 0-100 considering data quality, signal \
                 strength, historical precedent and agreement across prior steps.\n\n\
                 Then recommend ONE action:\n\
                 - ACT_NOW: high confidence, clear threat or opportunity needing immediate action\n\
                 - MONITOR: moderate confidence, worth watching over the next 24-48 hours\n\
                 - INVESTIGATE_FURTHER: low confidence, more data needed before acting\n\n\
                 Format:\n\
                 Overall confidence: [0-100]\n\
                 Recommendation: [ACT_NOW|MONITOR|INVESTIGATE_FURTHER]\n\
                 Reasoning: [2-3 sentences]",
                transcript(prior),
                scores.join("\n")
            )
        }
    };
    ReasoningPrompt::new(SYSTEM_PROMPT, user)
}
