//! External collaborators consumed by the pipeline.
//!
//! All synchronous; the runtime moves blocking calls onto
//! `tokio::task::spawn_blocking` where needed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CollaboratorError, StorageError};
use crate::types::{Competitor, ContentItem, ContentScore, FeedbackAction, Severity};

/// Source of recently ingested news and social items.
pub trait ContentFeed: Send + Sync {
    fn recent_items(&self, since: DateTime<Utc>) -> Result<Vec<ContentItem>, CollaboratorError>;
}

/// The content scoring model.
pub trait ContentScorer: Send + Sync {
    fn score(&self, item: &ContentItem) -> Result<ContentScore, CollaboratorError>;
}

/// Daily market indices and an aggregate sentiment in [0, 1].
pub trait MarketDataProvider: Send + Sync {
    fn daily_indices(&self) -> Result<BTreeMap<String, f64>, CollaboratorError>;

    fn sentiment(&self) -> Result<f64, CollaboratorError>;
}

/// Competitor discovery for a watched brand.
pub trait CompetitorDiscovery: Send + Sync {
    fn discover(&self, brand: &str) -> Result<Vec<Competitor>, CollaboratorError>;
}

/// A notification handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub alert_id: String,
    pub severity: Severity,
    pub title: String,
    pub summary: String,
    pub promoted: bool,
    /// Users watching the alert's brand; empty for global alerts.
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Skipped { reason: String },
}

/// Delivery channel (email, chat, webhook). Mechanics are out of scope.
pub trait NotificationDispatcher: Send + Sync {
    fn send(&self, notification: &Notification) -> Result<DeliveryOutcome, CollaboratorError>;
}

/// Sink for user feedback on alerts.
pub trait FeedbackCapture: Send + Sync {
    /// Returns `false` when the same `(alert_id, user, action)` was already recorded.
    fn record(
        &self,
        alert_id: &str,
        action: FeedbackAction,
        user: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<bool, StorageError>;
}
