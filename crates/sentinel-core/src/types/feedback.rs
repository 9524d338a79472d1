//! User feedback on alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Feedback action captured from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAction {
    Expand,
    ThumbsUp,
    ThumbsDown,
}

impl FeedbackAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expand => "expand",
            Self::ThumbsUp => "thumbs_up",
            Self::ThumbsDown => "thumbs_down",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "expand" => Some(Self::Expand),
            "thumbs_up" => Some(Self::ThumbsUp),
            "thumbs_down" => Some(Self::ThumbsDown),
            _ => None,
        }
    }
}

/// One feedback event. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertFeedback {
    pub alert_id: String,
    pub user: String,
    pub action: FeedbackAction,
    pub timestamp: DateTime<Utc>,
}

/// Feedback counts for one detector type over a tuning window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackTally {
    pub thumbs_up: u64,
    pub thumbs_down: u64,
    pub expand: u64,
}

impl FeedbackTally {
    pub fn record(&mut self, action: FeedbackAction) {
        match action {
            FeedbackAction::Expand => self.expand += 1,
            FeedbackAction::ThumbsUp => self.thumbs_up += 1,
            FeedbackAction::ThumbsDown => self.thumbs_down += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.thumbs_up + self.thumbs_down + self.expand
    }

    /// `thumbs_down / (thumbs_down + thumbs_up + ε)`.
    pub fn noise_ratio(&self) -> f64 {
        const EPSILON: f64 = 1e-9;
        self.thumbs_down as f64 / (self.thumbs_down as f64 + self.thumbs_up as f64 + EPSILON)
    }

    /// `(thumbs_up + expand) / total`, zero without feedback.
    pub fn value_ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.thumbs_up + self.expand) as f64 / total as f64
    }
}
