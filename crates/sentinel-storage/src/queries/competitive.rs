//! competitive_snapshots: one row per (brand, date), JSON payload.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use sentinel_core::errors::StorageError;
use sentinel_core::types::CompetitiveSnapshot;

use super::{format_date, from_json, to_json};
use crate::to_storage_err;

const TABLE: &str = "competitive_snapshots";

/// Store today's snapshot, replacing an earlier capture of the same day.
pub fn upsert_snapshot(conn: &Connection, snapshot: &CompetitiveSnapshot) -> Result<(), StorageError> {
    let payload = to_json(snapshot)?;
    conn.execute(
        "INSERT INTO competitive_snapshots (brand, date, payload) VALUES (?1, ?2, ?3)
         ON CONFLICT(brand, date) DO UPDATE SET payload = excluded.payload",
        params![snapshot.brand, format_date(snapshot.date), payload],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

/// Most recent snapshot strictly before `date`.
pub fn previous_snapshot(
    conn: &Connection,
    brand: &str,
    date: NaiveDate,
) -> Result<Option<CompetitiveSnapshot>, StorageError> {
    let payload: Option<String> = conn
        .prepare_cached(
            "SELECT payload FROM competitive_snapshots
             WHERE brand = ?1 AND date < ?2 ORDER BY date DESC LIMIT 1",
        )
        .and_then(|mut stmt| {
            stmt.query_row(params![brand, format_date(date)], |row| row.get(0))
                .optional()
        })
        .map_err(to_storage_err)?;
    payload.map(|p| from_json(TABLE, &p)).transpose()
}
