//! Situation reports grouping correlated alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A synthesized grouping of two or more correlated alerts.
///
/// Holds alert ids only; alerts point back through `Alert::situation_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SituationReport {
    pub id: String,
    pub title: String,
    pub member_alert_ids: Vec<String>,
    pub narrative: String,
    pub created_at: DateTime<Utc>,
    /// Earliest creation time the correlation pass considered.
    pub window_start: DateTime<Utc>,
}
