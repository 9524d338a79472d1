//! Reasoning chain steps and investigation results.

use serde::{Deserialize, Serialize};

/// The ordered investigation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    SituationAssessment,
    HistoricalContext,
    CausalAnalysis,
    StrategicImplications,
    ConfidenceScoring,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SituationAssessment => "situation_assessment",
            Self::HistoricalContext => "historical_context",
            Self::CausalAnalysis => "causal_analysis",
            Self::StrategicImplications => "strategic_implications",
            Self::ConfidenceScoring => "confidence_scoring",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::SituationAssessment => "Situation Assessment",
            Self::HistoricalContext => "Historical Context",
            Self::CausalAnalysis => "Causal Analysis",
            Self::StrategicImplications => "Strategic Implications",
            Self::ConfidenceScoring => "Confidence Assessment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Failed,
}

/// Output of one chain step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub kind: StepKind,
    pub status: StepStatus,
    pub content: String,
    /// Step confidence, 0-100.
    pub confidence: u8,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub likely_causes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommended_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frameworks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }
}

/// How a chain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStatus {
    /// Every planned step ran.
    Complete,
    /// Some steps failed or the chain was cancelled, but work was recorded.
    Partial,
    /// Running confidence fell below the bailout line.
    Bailout,
    /// No step completed.
    Incomplete,
}

impl ChainStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Partial => "partial",
            Self::Bailout => "bailout",
            Self::Incomplete => "investigation_incomplete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    ActNow,
    Monitor,
    InvestigateFurther,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ActNow => "act_now",
            Self::Monitor => "monitor",
            Self::InvestigateFurther => "investigate_further",
        }
    }
}

/// Result of a reasoning chain attached to an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investigation {
    pub steps: Vec<StepResult>,
    pub chain_status: ChainStatus,
    /// 0-100, `None` when nothing was scored.
    pub overall_confidence: Option<u8>,
    pub recommendation: Recommendation,
    pub summary: String,
}

impl Investigation {
    pub fn completed_steps(&self) -> impl Iterator<Item = &StepResult> {
        self.steps.iter().filter(|s| s.is_completed())
    }

    pub fn has_step(&self, kind: StepKind) -> bool {
        self.steps.iter().any(|s| s.kind == kind)
    }
}
