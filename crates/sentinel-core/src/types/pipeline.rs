//! Pipeline run bookkeeping and cycle summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Success,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One recorded pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub alerts_created: u64,
    pub error_message: Option<String>,
}

/// What one `run_pipeline_cycle` call did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub alerts_created: usize,
    pub alerts_suppressed: usize,
    pub situations_formed: usize,
    pub thresholds_adjusted: usize,
    pub drafts_evaluated: usize,
    pub bailouts: usize,
    pub notifications_sent: usize,
    pub competitive_skipped: usize,
    /// Closed-day snapshots written by this cycle.
    pub snapshots_captured: usize,
}
