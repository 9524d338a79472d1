//! alert_feedback and the tuner watermark.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use sentinel_core::errors::StorageError;
use sentinel_core::types::{AlertFeedback, DetectorType, FeedbackAction, FeedbackTally};

use super::from_unix;
use super::thresholds::parse_detector;
use crate::to_storage_err;

/// Feedback recorded after a watermark, tallied per detector type.
#[derive(Debug, Clone, Default)]
pub struct FeedbackWindow {
    pub tallies: BTreeMap<DetectorType, FeedbackTally>,
    /// Highest feedback id seen; the next watermark.
    pub max_id: i64,
}

/// Record feedback. Duplicate `(alert_id, user, action)` is ignored.
/// Returns whether a row was written.
pub fn insert_feedback(conn: &Connection, feedback: &AlertFeedback) -> Result<bool, StorageError> {
    let changed = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO alert_feedback (alert_id, user, action, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .and_then(|mut stmt| {
            stmt.execute(params![
                feedback.alert_id,
                feedback.user,
                feedback.action.as_str(),
                feedback.timestamp.timestamp(),
            ])
        })
        .map_err(to_storage_err)?;
    Ok(changed > 0)
}

/// Tally feedback with id greater than `after_id`, joined to alert detector types.
pub fn feedback_after(conn: &Connection, after_id: i64) -> Result<FeedbackWindow, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT f.id, a.detector_type, f.action
             FROM alert_feedback f JOIN alerts a ON a.id = f.alert_id
             WHERE f.id > ?1
             ORDER BY f.id ASC",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![after_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .map_err(to_storage_err)?;

    let mut window = FeedbackWindow {
        max_id: after_id,
        ..Default::default()
    };
    for row in rows {
        let (id, detector_type, action) = row.map_err(to_storage_err)?;
        let detector_type = parse_detector("alert_feedback", &detector_type)?;
        let action = FeedbackAction::parse(&action).ok_or_else(|| StorageError::CorruptRow {
            table: "alert_feedback",
            message: format!("unknown action {action:?}"),
        })?;
        window.tallies.entry(detector_type).or_default().record(action);
        window.max_id = window.max_id.max(id);
    }
    Ok(window)
}

pub fn feedback_for_alert(conn: &Connection, alert_id: &str) -> Result<Vec<AlertFeedback>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT alert_id, user, action, timestamp FROM alert_feedback
             WHERE alert_id = ?1 ORDER BY id ASC",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![alert_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })
        .map_err(to_storage_err)?;

    let mut result = Vec::new();
    for row in rows {
        let (alert_id, user, action, timestamp) = row.map_err(to_storage_err)?;
        result.push(AlertFeedback {
            alert_id,
            user,
            action: FeedbackAction::parse(&action).ok_or_else(|| StorageError::CorruptRow {
                table: "alert_feedback",
                message: format!("unknown action {action:?}"),
            })?,
            timestamp: from_unix("alert_feedback", timestamp)?,
        });
    }
    Ok(result)
}

// ─── Tuner watermark ────────────────────────────────────────────────────────

pub fn tuner_watermark(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT last_feedback_id FROM tuner_state WHERE id = 1", [], |row| row.get(0))
        .map_err(to_storage_err)
}

pub fn set_tuner_watermark(
    conn: &Connection,
    last_feedback_id: i64,
    run_at: DateTime<Utc>,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE tuner_state SET last_feedback_id = MAX(last_feedback_id, ?1), last_run_at = ?2 WHERE id = 1",
        params![last_feedback_id, run_at.timestamp()],
    )
    .map_err(to_storage_err)?;
    Ok(())
}
