//! alerts table queries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use sentinel_core::errors::StorageError;
use sentinel_core::types::{
    Alert, AlertFilter, AlertStatus, CooldownKey, DetectorType, Investigation, Scope, Severity,
};

use super::thresholds::parse_detector;
use super::{from_json, from_unix, to_json};
use crate::to_storage_err;

const TABLE: &str = "alerts";

const SELECT_COLUMNS: &str = "SELECT id, detector_type, scope, severity, title, summary,
        created_at, last_seen, cooldown_key, raw_metric_values, investigation,
        confidence, status, promoted, notified, situation_id
     FROM alerts";

/// Raw alert row before decoding.
#[derive(Debug, Clone)]
pub struct AlertRow {
    pub id: String,
    pub detector_type: String,
    pub scope: String,
    pub severity: String,
    pub title: String,
    pub summary: String,
    pub created_at: i64,
    pub last_seen: i64,
    pub cooldown_key: String,
    pub raw_metric_values: String,
    pub investigation: Option<String>,
    pub confidence: Option<i64>,
    pub status: String,
    pub promoted: bool,
    pub notified: bool,
    pub situation_id: Option<String>,
}

impl AlertRow {
    pub fn decode(self) -> Result<Alert, StorageError> {
        let corrupt = |message: String| StorageError::CorruptRow {
            table: TABLE,
            message,
        };
        let scope: Scope = self
            .scope
            .parse()
            .map_err(|_| corrupt(format!("bad scope {:?}", self.scope)))?;
        let cooldown_key: CooldownKey = self
            .cooldown_key
            .parse()
            .map_err(|_| corrupt(format!("bad cooldown key {:?}", self.cooldown_key)))?;
        let severity = Severity::parse(&self.severity)
            .ok_or_else(|| corrupt(format!("bad severity {:?}", self.severity)))?;
        let status = AlertStatus::parse(&self.status)
            .ok_or_else(|| corrupt(format!("bad status {:?}", self.status)))?;
        let raw_metric_values: BTreeMap<String, f64> = from_json(TABLE, &self.raw_metric_values)?;
        let investigation: Option<Investigation> = self
            .investigation
            .as_deref()
            .map(|text| from_json(TABLE, text))
            .transpose()?;
        let confidence = self
            .confidence
            .map(|c| u8::try_from(c).map_err(|_| corrupt(format!("confidence {c} out of range"))))
            .transpose()?;

        Ok(Alert {
            id: self.id,
            detector_type: parse_detector(TABLE, &self.detector_type)?,
            scope,
            severity,
            title: self.title,
            summary: self.summary,
            created_at: from_unix(TABLE, self.created_at)?,
            last_seen: from_unix(TABLE, self.last_seen)?,
            cooldown_key,
            raw_metric_values,
            investigation,
            confidence,
            status,
            promoted: self.promoted,
            notified: self.notified,
            situation_id: self.situation_id,
        })
    }
}

// ─── Writes ─────────────────────────────────────────────────────────────────

pub fn insert_alert(conn: &Connection, alert: &Alert) -> Result<(), StorageError> {
    let raw = to_json(&alert.raw_metric_values)?;
    let investigation = alert.investigation.as_ref().map(to_json).transpose()?;
    conn.prepare_cached(
        "INSERT INTO alerts (id, detector_type, scope, severity, title, summary,
            created_at, last_seen, cooldown_key, raw_metric_values, investigation,
            confidence, status, promoted, notified, situation_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
    )
    .and_then(|mut stmt| {
        stmt.execute(params![
            alert.id,
            alert.detector_type.as_str(),
            alert.scope.to_string(),
            alert.severity.as_str(),
            alert.title,
            alert.summary,
            alert.created_at.timestamp(),
            alert.last_seen.timestamp(),
            alert.cooldown_key.to_string(),
            raw,
            investigation,
            alert.confidence,
            alert.status.as_str(),
            alert.promoted,
            alert.notified,
            alert.situation_id,
        ])
    })
    .map_err(to_storage_err)?;
    Ok(())
}

/// Bump `last_seen` on an alert whose cooldown key suppressed a new detection.
pub fn touch_last_seen(conn: &Connection, id: &str, now: DateTime<Utc>) -> Result<bool, StorageError> {
    let changed = conn
        .execute(
            "UPDATE alerts SET last_seen = MAX(last_seen, ?1) WHERE id = ?2",
            params![now.timestamp(), id],
        )
        .map_err(to_storage_err)?;
    Ok(changed > 0)
}

pub fn mark_notified(conn: &Connection, id: &str) -> Result<(), StorageError> {
    conn.execute("UPDATE alerts SET notified = 1 WHERE id = ?1", params![id])
        .map_err(to_storage_err)?;
    Ok(())
}

/// Attach alerts to a situation report.
pub fn set_situation(
    conn: &Connection,
    alert_ids: &[String],
    situation_id: &str,
) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached("UPDATE alerts SET situation_id = ?1 WHERE id = ?2 AND situation_id IS NULL")
        .map_err(to_storage_err)?;
    let mut updated = 0;
    for id in alert_ids {
        updated += stmt.execute(params![situation_id, id]).map_err(to_storage_err)?;
    }
    Ok(updated)
}

// ─── Reads ──────────────────────────────────────────────────────────────────

pub fn get_alert(conn: &Connection, id: &str) -> Result<Option<Alert>, StorageError> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    let row = conn
        .prepare_cached(&sql)
        .map_err(to_storage_err)?
        .query_row(params![id], map_row)
        .optional()
        .map_err(to_storage_err)?;
    row.map(AlertRow::decode).transpose()
}

/// Alerts matching `filter`, newest first.
pub fn query_alerts(conn: &Connection, filter: &AlertFilter) -> Result<Vec<Alert>, StorageError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(dt) = filter.detector_type {
        clauses.push("detector_type = ?");
        values.push(Value::Text(dt.as_str().to_string()));
    }
    if let Some(ref scope) = filter.scope {
        clauses.push("scope = ?");
        values.push(Value::Text(scope.to_string()));
    }
    if let Some(severity) = filter.severity {
        clauses.push("severity = ?");
        values.push(Value::Text(severity.as_str().to_string()));
    }
    if let Some(status) = filter.status {
        clauses.push("status = ?");
        values.push(Value::Text(status.as_str().to_string()));
    }
    if let Some(since) = filter.since {
        clauses.push("created_at >= ?");
        values.push(Value::Integer(since.timestamp()));
    }
    if filter.correlated_only {
        clauses.push("situation_id IS NOT NULL");
    }

    let mut sql = String::from(SELECT_COLUMNS);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC, rowid DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
    }

    let mut stmt = conn.prepare_cached(&sql).map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params_from_iter(values), map_row)
        .map_err(to_storage_err)?;
    collect(rows)
}

/// Alerts created at or after `since` that belong to no situation, oldest first.
pub fn uncorrelated_since(conn: &Connection, since: DateTime<Utc>) -> Result<Vec<Alert>, StorageError> {
    let sql = format!(
        "{SELECT_COLUMNS} WHERE created_at >= ?1 AND situation_id IS NULL ORDER BY created_at ASC, rowid ASC"
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![since.timestamp()], map_row)
        .map_err(to_storage_err)?;
    collect(rows)
}

/// Prior alerts of the same detector type, newest first, used as precedent.
pub fn precedent_alerts(
    conn: &Connection,
    detector_type: DetectorType,
    since: DateTime<Utc>,
    exclude_id: &str,
    limit: usize,
) -> Result<Vec<Alert>, StorageError> {
    let sql = format!(
        "{SELECT_COLUMNS} WHERE detector_type = ?1 AND created_at >= ?2 AND id != ?3
         ORDER BY created_at DESC LIMIT ?4"
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(to_storage_err)?;
    let rows = stmt
        .query_map(
            params![
                detector_type.as_str(),
                since.timestamp(),
                exclude_id,
                i64::try_from(limit).unwrap_or(i64::MAX)
            ],
            map_row,
        )
        .map_err(to_storage_err)?;
    collect(rows)
}

pub fn count_alerts(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM alerts", [], |row| row.get(0))
        .map_err(to_storage_err)
}

fn collect(
    rows: impl Iterator<Item = rusqlite::Result<AlertRow>>,
) -> Result<Vec<Alert>, StorageError> {
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(to_storage_err)?.decode()?);
    }
    Ok(result)
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AlertRow> {
    Ok(AlertRow {
        id: row.get(0)?,
        detector_type: row.get(1)?,
        scope: row.get(2)?,
        severity: row.get(3)?,
        title: row.get(4)?,
        summary: row.get(5)?,
        created_at: row.get(6)?,
        last_seen: row.get(7)?,
        cooldown_key: row.get(8)?,
        raw_metric_values: row.get(9)?,
        investigation: row.get(10)?,
        confidence: row.get(11)?,
        status: row.get(12)?,
        promoted: row.get(13)?,
        notified: row.get(14)?,
        situation_id: row.get(15)?,
    })
}
