//! pipeline_runs: one row per cycle.

use rusqlite::{params, Connection};
use sentinel_core::errors::StorageError;
use sentinel_core::types::{PipelineRun, RunStatus};

use super::from_unix;
use crate::to_storage_err;

/// Insert a run with status `running`. Returns the row id.
pub fn insert_run_start(conn: &Connection, started_at: i64) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO pipeline_runs (started_at, status) VALUES (?1, 'running')",
        params![started_at],
    )
    .map_err(to_storage_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn complete_run(
    conn: &Connection,
    id: i64,
    completed_at: i64,
    status: RunStatus,
    alerts_created: u64,
    error_message: Option<&str>,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE pipeline_runs SET completed_at = ?1, status = ?2, alerts_created = ?3, error_message = ?4
         WHERE id = ?5",
        params![
            completed_at,
            status.as_str(),
            i64::try_from(alerts_created).unwrap_or(i64::MAX),
            error_message,
            id
        ],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

/// Number of runs started in `[from, to)`.
pub fn count_runs_started(conn: &Connection, from: i64, to: i64) -> Result<usize, StorageError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pipeline_runs WHERE started_at >= ?1 AND started_at < ?2",
            params![from, to],
            |row| row.get(0),
        )
        .map_err(to_storage_err)?;
    Ok(usize::try_from(count).unwrap_or(0))
}

/// Most recent runs, newest first.
pub fn recent_runs(conn: &Connection, limit: usize) -> Result<Vec<PipelineRun>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, started_at, completed_at, status, alerts_created, error_message
             FROM pipeline_runs ORDER BY id DESC LIMIT ?1",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![i64::try_from(limit).unwrap_or(i64::MAX)], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })
        .map_err(to_storage_err)?;

    let mut result = Vec::new();
    for row in rows {
        let (id, started_at, completed_at, status, alerts_created, error_message) =
            row.map_err(to_storage_err)?;
        result.push(PipelineRun {
            id,
            started_at: from_unix("pipeline_runs", started_at)?,
            completed_at: completed_at
                .map(|t| from_unix("pipeline_runs", t))
                .transpose()?,
            status: RunStatus::parse(&status).ok_or_else(|| StorageError::CorruptRow {
                table: "pipeline_runs",
                message: format!("unknown status {status:?}"),
            })?,
            alerts_created: u64::try_from(alerts_created).unwrap_or(0),
            error_message,
        });
    }
    Ok(result)
}
