//! situation_reports table queries.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use sentinel_core::errors::StorageError;
use sentinel_core::types::SituationReport;

use super::{from_json, from_unix, to_json};
use crate::to_storage_err;

const TABLE: &str = "situation_reports";

#[derive(Debug, Clone)]
pub struct SituationRow {
    pub id: String,
    pub title: String,
    pub narrative: String,
    pub member_alert_ids: String,
    pub created_at: i64,
    pub window_start: i64,
}

impl SituationRow {
    fn decode(self) -> Result<SituationReport, StorageError> {
        Ok(SituationReport {
            id: self.id,
            title: self.title,
            member_alert_ids: from_json(TABLE, &self.member_alert_ids)?,
            narrative: self.narrative,
            created_at: from_unix(TABLE, self.created_at)?,
            window_start: from_unix(TABLE, self.window_start)?,
        })
    }
}

pub fn insert_situation(conn: &Connection, report: &SituationReport) -> Result<(), StorageError> {
    let members = to_json(&report.member_alert_ids)?;
    conn.execute(
        "INSERT INTO situation_reports (id, title, narrative, member_alert_ids, created_at, window_start)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            report.id,
            report.title,
            report.narrative,
            members,
            report.created_at.timestamp(),
            report.window_start.timestamp(),
        ],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

pub fn get_situation(conn: &Connection, id: &str) -> Result<Option<SituationReport>, StorageError> {
    let row = conn
        .prepare_cached(
            "SELECT id, title, narrative, member_alert_ids, created_at, window_start
             FROM situation_reports WHERE id = ?1",
        )
        .and_then(|mut stmt| stmt.query_row(params![id], map_row).optional())
        .map_err(to_storage_err)?;
    row.map(SituationRow::decode).transpose()
}

/// Reports created at or after `since`, newest first.
pub fn situations_since(
    conn: &Connection,
    since: DateTime<Utc>,
) -> Result<Vec<SituationReport>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, title, narrative, member_alert_ids, created_at, window_start
             FROM situation_reports WHERE created_at >= ?1
             ORDER BY created_at DESC, rowid DESC",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![since.timestamp()], map_row)
        .map_err(to_storage_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(to_storage_err)?.decode()?);
    }
    Ok(result)
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SituationRow> {
    Ok(SituationRow {
        id: row.get(0)?,
        title: row.get(1)?,
        narrative: row.get(2)?,
        member_alert_ids: row.get(3)?,
        created_at: row.get(4)?,
        window_start: row.get(5)?,
    })
}
