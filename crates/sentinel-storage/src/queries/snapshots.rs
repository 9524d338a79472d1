//! metric_snapshots: one immutable row per (scope, date), written once the
//! day has closed.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use sentinel_core::errors::StorageError;
use sentinel_core::types::{MetricSnapshot, Scope};

use super::{format_date, from_json, parse_date, to_json};
use crate::to_storage_err;

const TABLE: &str = "metric_snapshots";

/// Raw row before decoding.
#[derive(Debug, Clone)]
pub struct SnapshotRow {
    pub scope: String,
    pub date: String,
    pub metrics: String,
}

impl SnapshotRow {
    fn decode(self) -> Result<MetricSnapshot, StorageError> {
        let scope: Scope = self.scope.parse().map_err(|e| StorageError::CorruptRow {
            table: TABLE,
            message: format!("{e}"),
        })?;
        let metrics: BTreeMap<String, f64> = from_json(TABLE, &self.metrics)?;
        Ok(MetricSnapshot {
            scope,
            date: parse_date(TABLE, &self.date)?,
            metrics,
        })
    }
}

/// Insert a snapshot. An existing `(scope, date)` row is left untouched.
/// Returns whether a row was written.
pub fn insert_snapshot(
    conn: &Connection,
    snapshot: &MetricSnapshot,
    captured_at: i64,
) -> Result<bool, StorageError> {
    let metrics = to_json(&snapshot.metrics)?;
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO metric_snapshots (scope, date, metrics, captured_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(scope, date) DO NOTHING",
        )
        .map_err(to_storage_err)?;
    let changed = stmt
        .execute(params![
            snapshot.scope.to_string(),
            format_date(snapshot.date),
            metrics,
            captured_at,
        ])
        .map_err(to_storage_err)?;
    Ok(changed > 0)
}

pub fn get_snapshot(
    conn: &Connection,
    scope: &Scope,
    date: NaiveDate,
) -> Result<Option<MetricSnapshot>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT scope, date, metrics FROM metric_snapshots WHERE scope = ?1 AND date = ?2")
        .map_err(to_storage_err)?;
    let mut rows = stmt
        .query_map(params![scope.to_string(), format_date(date)], map_row)
        .map_err(to_storage_err)?;
    match rows.next() {
        Some(row) => Ok(Some(row.map_err(to_storage_err)?.decode()?)),
        None => Ok(None),
    }
}

/// Snapshots for `scope` with `from <= date <= to`, oldest first.
pub fn snapshot_history(
    conn: &Connection,
    scope: &Scope,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<MetricSnapshot>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT scope, date, metrics FROM metric_snapshots
             WHERE scope = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date ASC",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(
            params![scope.to_string(), format_date(from), format_date(to)],
            map_row,
        )
        .map_err(to_storage_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(to_storage_err)?.decode()?);
    }
    Ok(result)
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SnapshotRow> {
    Ok(SnapshotRow {
        scope: row.get(0)?,
        date: row.get(1)?,
        metrics: row.get(2)?,
    })
}
