//! alert_thresholds and the append-only threshold_audit log.

use rusqlite::{params, Connection, OptionalExtension};
use sentinel_core::errors::StorageError;
use sentinel_core::types::{AdjustmentSource, AlertThreshold, DetectorType, ThresholdAuditEntry};

use super::from_unix;
use crate::to_storage_err;

#[derive(Debug, Clone)]
pub struct ThresholdRow {
    pub detector_type: String,
    pub default_value: f64,
    pub current_value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub last_updated: i64,
}

impl ThresholdRow {
    fn decode(self) -> Result<AlertThreshold, StorageError> {
        Ok(AlertThreshold {
            detector_type: parse_detector("alert_thresholds", &self.detector_type)?,
            default_value: self.default_value,
            current_value: self.current_value,
            lower_bound: self.lower_bound,
            upper_bound: self.upper_bound,
            last_updated: from_unix("alert_thresholds", self.last_updated)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AuditRow {
    pub id: i64,
    pub detector_type: String,
    pub old_value: f64,
    pub new_value: f64,
    pub reason: String,
    pub source: String,
    pub timestamp: i64,
}

impl AuditRow {
    fn decode(self) -> Result<ThresholdAuditEntry, StorageError> {
        let source = AdjustmentSource::parse(&self.source).ok_or_else(|| StorageError::CorruptRow {
            table: "threshold_audit",
            message: format!("unknown source {:?}", self.source),
        })?;
        Ok(ThresholdAuditEntry {
            threshold_id: parse_detector("threshold_audit", &self.detector_type)?,
            old_value: self.old_value,
            new_value: self.new_value,
            reason: self.reason,
            source,
            timestamp: from_unix("threshold_audit", self.timestamp)?,
        })
    }
}

pub(crate) fn parse_detector(table: &'static str, s: &str) -> Result<DetectorType, StorageError> {
    s.parse().map_err(|_| StorageError::CorruptRow {
        table,
        message: format!("unknown detector type {s:?}"),
    })
}

// ─── Thresholds ─────────────────────────────────────────────────────────────

pub fn get_all_thresholds(conn: &Connection) -> Result<Vec<AlertThreshold>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT detector_type, default_value, current_value, lower_bound, upper_bound, last_updated
             FROM alert_thresholds ORDER BY detector_type",
        )
        .map_err(to_storage_err)?;
    let rows = stmt.query_map([], map_threshold).map_err(to_storage_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(to_storage_err)?.decode()?);
    }
    Ok(result)
}

pub fn get_threshold(
    conn: &Connection,
    detector_type: DetectorType,
) -> Result<Option<AlertThreshold>, StorageError> {
    let row = conn
        .prepare_cached(
            "SELECT detector_type, default_value, current_value, lower_bound, upper_bound, last_updated
             FROM alert_thresholds WHERE detector_type = ?1",
        )
        .map_err(to_storage_err)?
        .query_row(params![detector_type.as_str()], map_threshold)
        .optional()
        .map_err(to_storage_err)?;
    row.map(ThresholdRow::decode).transpose()
}

pub fn update_threshold_value(
    conn: &Connection,
    detector_type: DetectorType,
    value: f64,
    updated_at: i64,
) -> Result<(), StorageError> {
    let changed = conn
        .execute(
            "UPDATE alert_thresholds SET current_value = ?1, last_updated = ?2 WHERE detector_type = ?3",
            params![value, updated_at, detector_type.as_str()],
        )
        .map_err(to_storage_err)?;
    if changed == 0 {
        return Err(StorageError::NotFound {
            entity: "threshold",
            id: detector_type.to_string(),
        });
    }
    Ok(())
}

// ─── Audit log ──────────────────────────────────────────────────────────────

pub fn insert_audit(conn: &Connection, entry: &ThresholdAuditEntry) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO threshold_audit (detector_type, old_value, new_value, reason, source, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.threshold_id.as_str(),
            entry.old_value,
            entry.new_value,
            entry.reason,
            entry.source.as_str(),
            entry.timestamp.timestamp(),
        ],
    )
    .map_err(to_storage_err)?;
    Ok(conn.last_insert_rowid())
}

/// Audit entries oldest first, optionally for one detector type.
pub fn audit_log(
    conn: &Connection,
    detector_type: Option<DetectorType>,
) -> Result<Vec<ThresholdAuditEntry>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, detector_type, old_value, new_value, reason, source, timestamp
             FROM threshold_audit
             WHERE ?1 IS NULL OR detector_type = ?1
             ORDER BY id ASC",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![detector_type.map(|d| d.as_str())], |row| {
            Ok(AuditRow {
                id: row.get(0)?,
                detector_type: row.get(1)?,
                old_value: row.get(2)?,
                new_value: row.get(3)?,
                reason: row.get(4)?,
                source: row.get(5)?,
                timestamp: row.get(6)?,
            })
        })
        .map_err(to_storage_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(to_storage_err)?.decode()?);
    }
    Ok(result)
}

fn map_threshold(row: &rusqlite::Row<'_>) -> rusqlite::Result<ThresholdRow> {
    Ok(ThresholdRow {
        detector_type: row.get(0)?,
        default_value: row.get(1)?,
        current_value: row.get(2)?,
        lower_bound: row.get(3)?,
        upper_bound: row.get(4)?,
        last_updated: row.get(5)?,
    })
}
