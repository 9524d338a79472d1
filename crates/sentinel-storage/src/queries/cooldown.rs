//! cooldown_reservations: one live row per cooldown key.

use rusqlite::{params, Connection, OptionalExtension};
use sentinel_core::errors::StorageError;

use crate::to_storage_err;

/// Remove the row for `key` if its window has passed.
pub fn delete_expired_key(conn: &Connection, key: &str, now: i64) -> Result<usize, StorageError> {
    conn.prepare_cached("DELETE FROM cooldown_reservations WHERE cooldown_key = ?1 AND expires_at <= ?2")
        .and_then(|mut stmt| stmt.execute(params![key, now]))
        .map_err(to_storage_err)
}

/// Insert a reservation unless one exists. Returns whether this call won the key.
pub fn try_insert(
    conn: &Connection,
    key: &str,
    alert_id: &str,
    reserved_at: i64,
    expires_at: i64,
) -> Result<bool, StorageError> {
    let changed = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO cooldown_reservations (cooldown_key, alert_id, reserved_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .and_then(|mut stmt| stmt.execute(params![key, alert_id, reserved_at, expires_at]))
        .map_err(to_storage_err)?;
    Ok(changed > 0)
}

/// The alert currently holding `key`.
pub fn holder(conn: &Connection, key: &str) -> Result<Option<String>, StorageError> {
    conn.prepare_cached("SELECT alert_id FROM cooldown_reservations WHERE cooldown_key = ?1")
        .and_then(|mut stmt| stmt.query_row(params![key], |row| row.get(0)).optional())
        .map_err(to_storage_err)
}

pub fn delete_key(conn: &Connection, key: &str) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM cooldown_reservations WHERE cooldown_key = ?1", params![key])
        .map_err(to_storage_err)
}

/// Drop every expired reservation. Returns the number removed.
pub fn purge_expired(conn: &Connection, now: i64) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM cooldown_reservations WHERE expires_at <= ?1", params![now])
        .map_err(to_storage_err)
}
