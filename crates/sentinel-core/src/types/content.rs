//! Scored content items delivered by the content feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    News,
    Social,
}

/// Output of the content scoring model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentScore {
    /// In [0, 1].
    pub empathy_score: f64,
    pub empathy_label: String,
    /// At most three.
    pub top_emotions: Vec<String>,
    pub topic: String,
    /// In [1, 5].
    pub intensity: f64,
}

/// A news article or social post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub channel: Channel,
    pub source: String,
    pub title: String,
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub score: Option<ContentScore>,
}

impl ContentItem {
    /// Case-insensitive brand match on title, text or source.
    pub fn mentions(&self, name: &str) -> bool {
        let needle = name.to_lowercase();
        if needle.is_empty() {
            return false;
        }
        self.title.to_lowercase().contains(&needle)
            || self.text.to_lowercase().contains(&needle)
            || self.source.to_lowercase().contains(&needle)
    }
}
