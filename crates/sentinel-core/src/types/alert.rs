//! Alerts, alert drafts, and cooldown keys.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{DetectorType, Investigation, Scope};
use crate::errors::DetectionError;

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Predictive,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Predictive => "predictive",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(Self::Info),
            "predictive" => Some(Self::Predictive),
            "warning" => Some(Self::Warning),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Ordering rank, higher is more severe.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Info => 0,
            Self::Predictive => 1,
            Self::Warning => 2,
            Self::Critical => 3,
        }
    }
}

/// Alert lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Open,
    Investigated,
    Bailout,
    Suppressed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Investigated => "investigated",
            Self::Bailout => "bailout",
            Self::Suppressed => "suppressed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "investigated" => Some(Self::Investigated),
            "bailout" => Some(Self::Bailout),
            "suppressed" => Some(Self::Suppressed),
            _ => None,
        }
    }
}

/// Deduplication identity: `(detector_type, scope, time bucket)`.
///
/// The bucket is `floor(unix_seconds / window)` for the detector's cooldown
/// window, so every detection inside one window shares a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CooldownKey {
    pub detector_type: DetectorType,
    pub scope: Scope,
    pub bucket: i64,
}

impl CooldownKey {
    pub fn new(detector_type: DetectorType, scope: Scope, now: DateTime<Utc>) -> Self {
        let bucket = now.timestamp().div_euclid(detector_type.cooldown_secs());
        Self {
            detector_type,
            scope,
            bucket,
        }
    }

    pub fn window_secs(&self) -> i64 {
        self.detector_type.cooldown_secs()
    }

    /// Start of the bucket this key covers.
    pub fn bucket_start(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.bucket * self.window_secs(), 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// A reservation for this key stops suppressing at this instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt((self.bucket + 1) * self.window_secs(), 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl fmt::Display for CooldownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.detector_type, self.scope, self.bucket)
    }
}

impl FromStr for CooldownKey {
    type Err = DetectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, '|');
        let detector_type: DetectorType = parts.next().unwrap_or_default().parse()?;
        let rest = parts.next().ok_or_else(|| DetectionError::InvalidScope(s.to_string()))?;
        let (scope, bucket) = rest
            .rsplit_once('|')
            .ok_or_else(|| DetectionError::InvalidScope(s.to_string()))?;
        let bucket = bucket
            .parse::<i64>()
            .map_err(|_| DetectionError::InvalidScope(s.to_string()))?;
        Ok(Self {
            detector_type,
            scope: scope.parse()?,
            bucket,
        })
    }
}

impl TryFrom<String> for CooldownKey {
    type Error = DetectionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CooldownKey> for String {
    fn from(key: CooldownKey) -> Self {
        key.to_string()
    }
}

/// Detector output before deduplication and investigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDraft {
    pub detector_type: DetectorType,
    pub scope: Scope,
    pub severity: Severity,
    pub title: String,
    pub summary: String,
    pub raw_metric_values: BTreeMap<String, f64>,
    /// R² of the trend fit, predictive detectors only.
    pub fit_quality: Option<f64>,
    /// Converging weak-signal count, compound detector only.
    pub compound_score: Option<u32>,
    /// Severity was forced to warning by auto-promotion.
    pub promoted: bool,
    pub cooldown_key: CooldownKey,
}

impl AlertDraft {
    pub fn new(
        detector_type: DetectorType,
        scope: Scope,
        severity: Severity,
        now: DateTime<Utc>,
    ) -> Self {
        let cooldown_key = CooldownKey::new(detector_type, scope.clone(), now);
        Self {
            detector_type,
            scope,
            severity,
            title: String::new(),
            summary: String::new(),
            raw_metric_values: BTreeMap::new(),
            fit_quality: None,
            compound_score: None,
            promoted: false,
            cooldown_key,
        }
    }

    pub fn titled(mut self, title: impl Into<String>, summary: impl Into<String>) -> Self {
        self.title = title.into();
        self.summary = summary.into();
        self
    }

    pub fn metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.raw_metric_values.insert(name.into(), value);
        self
    }
}

/// A persisted alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub detector_type: DetectorType,
    pub scope: Scope,
    pub severity: Severity,
    pub title: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub cooldown_key: CooldownKey,
    pub raw_metric_values: BTreeMap<String, f64>,
    pub investigation: Option<Investigation>,
    /// 0-100, `None` when the chain never reached a scored step.
    pub confidence: Option<u8>,
    pub status: AlertStatus,
    pub promoted: bool,
    pub notified: bool,
    pub situation_id: Option<String>,
}

impl Alert {
    /// Build an open alert from a draft that won its cooldown reservation.
    pub fn from_draft(draft: AlertDraft, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            detector_type: draft.detector_type,
            scope: draft.scope,
            severity: draft.severity,
            title: draft.title,
            summary: draft.summary,
            created_at: now,
            last_seen: now,
            cooldown_key: draft.cooldown_key,
            raw_metric_values: draft.raw_metric_values,
            investigation: None,
            confidence: None,
            status: AlertStatus::Open,
            promoted: draft.promoted,
            notified: false,
            situation_id: None,
        }
    }

    /// Critical, warning and promoted alerts go out to subscribers.
    pub fn should_notify(&self) -> bool {
        self.promoted || matches!(self.severity, Severity::Critical | Severity::Warning)
    }

    pub fn is_correlated(&self) -> bool {
        self.situation_id.is_some()
    }
}

/// Filters for alert queries. Empty filter returns the newest alerts.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub detector_type: Option<DetectorType>,
    pub scope: Option<Scope>,
    pub severity: Option<Severity>,
    pub status: Option<AlertStatus>,
    pub since: Option<DateTime<Utc>>,
    pub correlated_only: bool,
    pub limit: Option<usize>,
}
