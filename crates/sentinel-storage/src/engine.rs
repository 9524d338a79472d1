//! StorageEngine: typed facade over the database used by the runtime.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sentinel_core::errors::{StorageError, ThresholdError};
use sentinel_core::traits::FeedbackCapture;
use sentinel_core::types::{
    AdjustmentSource, Alert, AlertFeedback, AlertFilter, AlertThreshold, BrandWatch,
    CompetitiveSnapshot, DetectorType, FeedbackAction, MetricSnapshot, PipelineRun, RunStatus,
    Scope, SituationReport, ThresholdAuditEntry,
};

use crate::connection::writer::with_immediate_transaction;
use crate::connection::DatabaseManager;
use crate::queries::{
    alerts, competitive, feedback, pipeline_runs, situations, snapshots, thresholds, watchlist,
};

pub use crate::queries::feedback::FeedbackWindow;

/// A requested threshold change, applied through the audited write path.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdChange {
    pub detector_type: DetectorType,
    pub new_value: f64,
    pub reason: String,
    pub source: AdjustmentSource,
}

/// Owns the database manager and exposes one method per persisted operation.
/// Every mutation runs as its own transaction.
#[derive(Clone)]
pub struct StorageEngine {
    db: Arc<DatabaseManager>,
}

impl StorageEngine {
    pub fn open(path: &Path, read_pool_size: usize) -> Result<Self, StorageError> {
        Ok(Self {
            db: Arc::new(DatabaseManager::open(path, read_pool_size)?),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            db: Arc::new(DatabaseManager::open_in_memory()?),
        })
    }

    /// Shared handle for components that need raw access (the cooldown ledger).
    pub fn database(&self) -> Arc<DatabaseManager> {
        Arc::clone(&self.db)
    }

    // ─── Snapshots ──────────────────────────────────────────────────────────

    /// Write a closed day's snapshot. An existing `(scope, date)` row wins.
    /// Returns whether the snapshot was new.
    pub fn insert_snapshot(&self, snapshot: &MetricSnapshot, now: DateTime<Utc>) -> Result<bool, StorageError> {
        self.db
            .with_writer(|conn| snapshots::insert_snapshot(conn, snapshot, now.timestamp()))
    }

    pub fn snapshot(&self, scope: &Scope, date: NaiveDate) -> Result<Option<MetricSnapshot>, StorageError> {
        self.db.with_reader(|conn| snapshots::get_snapshot(conn, scope, date))
    }

    pub fn snapshot_history(
        &self,
        scope: &Scope,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MetricSnapshot>, StorageError> {
        self.db
            .with_reader(|conn| snapshots::snapshot_history(conn, scope, from, to))
    }

    // ─── Thresholds ─────────────────────────────────────────────────────────

    pub fn thresholds(&self) -> Result<Vec<AlertThreshold>, StorageError> {
        self.db.with_reader(thresholds::get_all_thresholds)
    }

    pub fn threshold(&self, detector_type: DetectorType) -> Result<Option<AlertThreshold>, StorageError> {
        self.db
            .with_reader(|conn| thresholds::get_threshold(conn, detector_type))
    }

    /// Apply threshold changes atomically, one audit row per change.
    ///
    /// Values outside a threshold's bounds reject the whole batch. Changes
    /// whose value equals the current one are skipped and not audited.
    pub fn apply_threshold_changes(
        &self,
        changes: &[ThresholdChange],
        now: DateTime<Utc>,
    ) -> Result<Vec<ThresholdAuditEntry>, ThresholdError> {
        let outcome = self.db.with_writer(|conn| {
            Ok(with_immediate_transaction(conn, |tx| {
                let mut entries = Vec::with_capacity(changes.len());
                for change in changes {
                    let current = thresholds::get_threshold(tx, change.detector_type)?
                        .ok_or_else(|| ThresholdError::UnknownDetector(change.detector_type.to_string()))?;
                    if !(change.new_value.is_finite() && change.new_value > 0.0) {
                        return Err(ThresholdError::InvalidValue {
                            detector_type: change.detector_type.to_string(),
                            value: change.new_value,
                        });
                    }
                    if !current.contains(change.new_value) {
                        return Err(ThresholdError::OutOfBounds {
                            detector_type: change.detector_type.to_string(),
                            value: change.new_value,
                            lower: current.lower_bound,
                            upper: current.upper_bound,
                        });
                    }
                    if change.new_value == current.current_value {
                        continue;
                    }
                    thresholds::update_threshold_value(
                        tx,
                        change.detector_type,
                        change.new_value,
                        now.timestamp(),
                    )?;
                    let entry = ThresholdAuditEntry {
                        threshold_id: change.detector_type,
                        old_value: current.current_value,
                        new_value: change.new_value,
                        reason: change.reason.clone(),
                        source: change.source,
                        timestamp: now,
                    };
                    thresholds::insert_audit(tx, &entry)?;
                    entries.push(entry);
                }
                Ok(entries)
            }))
        })?;
        outcome
    }

    pub fn threshold_audit_log(
        &self,
        detector_type: Option<DetectorType>,
    ) -> Result<Vec<ThresholdAuditEntry>, StorageError> {
        self.db
            .with_reader(|conn| thresholds::audit_log(conn, detector_type))
    }

    // ─── Alerts ─────────────────────────────────────────────────────────────

    pub fn insert_alert(&self, alert: &Alert) -> Result<(), StorageError> {
        self.db.with_writer(|conn| alerts::insert_alert(conn, alert))
    }

    pub fn alert(&self, id: &str) -> Result<Option<Alert>, StorageError> {
        self.db.with_reader(|conn| alerts::get_alert(conn, id))
    }

    pub fn query_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>, StorageError> {
        self.db.with_reader(|conn| alerts::query_alerts(conn, filter))
    }

    pub fn touch_alert(&self, id: &str, now: DateTime<Utc>) -> Result<bool, StorageError> {
        self.db.with_writer(|conn| alerts::touch_last_seen(conn, id, now))
    }

    pub fn mark_notified(&self, id: &str) -> Result<(), StorageError> {
        self.db.with_writer(|conn| alerts::mark_notified(conn, id))
    }

    pub fn uncorrelated_alerts_since(&self, since: DateTime<Utc>) -> Result<Vec<Alert>, StorageError> {
        self.db
            .with_reader(|conn| alerts::uncorrelated_since(conn, since))
    }

    pub fn precedent_alerts(
        &self,
        detector_type: DetectorType,
        since: DateTime<Utc>,
        exclude_id: &str,
        limit: usize,
    ) -> Result<Vec<Alert>, StorageError> {
        self.db.with_reader(|conn| {
            alerts::precedent_alerts(conn, detector_type, since, exclude_id, limit)
        })
    }

    // ─── Situations ─────────────────────────────────────────────────────────

    /// Persist a report and link its members in one transaction.
    pub fn insert_situation(&self, report: &SituationReport) -> Result<usize, StorageError> {
        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                situations::insert_situation(tx, report)?;
                alerts::set_situation(tx, &report.member_alert_ids, &report.id)
            })
        })
    }

    pub fn situation(&self, id: &str) -> Result<Option<SituationReport>, StorageError> {
        self.db.with_reader(|conn| situations::get_situation(conn, id))
    }

    pub fn situations_since(&self, since: DateTime<Utc>) -> Result<Vec<SituationReport>, StorageError> {
        self.db
            .with_reader(|conn| situations::situations_since(conn, since))
    }

    // ─── Feedback ───────────────────────────────────────────────────────────

    /// Record feedback for an existing alert. Returns whether it was new.
    pub fn record_feedback(&self, entry: &AlertFeedback) -> Result<bool, StorageError> {
        self.db.with_writer(|conn| {
            if alerts::get_alert(conn, &entry.alert_id)?.is_none() {
                return Err(StorageError::NotFound {
                    entity: "alert",
                    id: entry.alert_id.clone(),
                });
            }
            feedback::insert_feedback(conn, entry)
        })
    }

    pub fn feedback_for_alert(&self, alert_id: &str) -> Result<Vec<AlertFeedback>, StorageError> {
        self.db
            .with_reader(|conn| feedback::feedback_for_alert(conn, alert_id))
    }

    /// Feedback recorded since the last tuning pass.
    pub fn pending_feedback(&self) -> Result<FeedbackWindow, StorageError> {
        self.db.with_writer(|conn| {
            let watermark = feedback::tuner_watermark(conn)?;
            feedback::feedback_after(conn, watermark)
        })
    }

    pub fn advance_tuner_watermark(&self, last_feedback_id: i64, now: DateTime<Utc>) -> Result<(), StorageError> {
        self.db
            .with_writer(|conn| feedback::set_tuner_watermark(conn, last_feedback_id, now))
    }

    // ─── Watchlist ──────────────────────────────────────────────────────────

    pub fn add_watch(&self, watch: &BrandWatch, now: DateTime<Utc>) -> Result<bool, StorageError> {
        self.db
            .with_writer(|conn| watchlist::add_watch(conn, watch, now.timestamp()))
    }

    pub fn remove_watch(&self, watch: &BrandWatch) -> Result<bool, StorageError> {
        self.db.with_writer(|conn| watchlist::remove_watch(conn, watch))
    }

    pub fn watched_brands(&self) -> Result<Vec<String>, StorageError> {
        self.db.with_reader(watchlist::watched_brands)
    }

    pub fn watchers_of(&self, brand: &str) -> Result<Vec<String>, StorageError> {
        self.db.with_reader(|conn| watchlist::watchers_of(conn, brand))
    }

    // ─── Competitive ────────────────────────────────────────────────────────

    pub fn upsert_competitive_snapshot(&self, snapshot: &CompetitiveSnapshot) -> Result<(), StorageError> {
        self.db
            .with_writer(|conn| competitive::upsert_snapshot(conn, snapshot))
    }

    pub fn previous_competitive_snapshot(
        &self,
        brand: &str,
        date: NaiveDate,
    ) -> Result<Option<CompetitiveSnapshot>, StorageError> {
        self.db
            .with_reader(|conn| competitive::previous_snapshot(conn, brand, date))
    }

    // ─── Pipeline runs ──────────────────────────────────────────────────────

    pub fn start_run(&self, now: DateTime<Utc>) -> Result<i64, StorageError> {
        self.db
            .with_writer(|conn| pipeline_runs::insert_run_start(conn, now.timestamp()))
    }

    pub fn complete_run(
        &self,
        id: i64,
        now: DateTime<Utc>,
        status: RunStatus,
        alerts_created: u64,
        error_message: Option<&str>,
    ) -> Result<(), StorageError> {
        self.db.with_writer(|conn| {
            pipeline_runs::complete_run(
                conn,
                id,
                now.timestamp(),
                status,
                alerts_created,
                error_message,
            )
        })
    }

    /// Runs started at or after `from` and before `to`.
    pub fn runs_started_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<usize, StorageError> {
        self.db
            .with_reader(|conn| pipeline_runs::count_runs_started(conn, from.timestamp(), to.timestamp()))
    }

    pub fn recent_runs(&self, limit: usize) -> Result<Vec<PipelineRun>, StorageError> {
        self.db.with_reader(|conn| pipeline_runs::recent_runs(conn, limit))
    }
}

impl FeedbackCapture for StorageEngine {
    fn record(
        &self,
        alert_id: &str,
        action: FeedbackAction,
        user: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        self.record_feedback(&AlertFeedback {
            alert_id: alert_id.to_string(),
            user: user.to_string(),
            action,
            timestamp,
        })
    }
}
