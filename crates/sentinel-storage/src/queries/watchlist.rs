//! brand_watchlist table queries.

use rusqlite::{params, Connection};
use sentinel_core::errors::StorageError;
use sentinel_core::types::BrandWatch;

use crate::to_storage_err;

/// Returns whether the watch was newly added.
pub fn add_watch(conn: &Connection, watch: &BrandWatch, created_at: i64) -> Result<bool, StorageError> {
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO brand_watchlist (user, brand, created_at) VALUES (?1, ?2, ?3)",
            params![watch.user, watch.brand, created_at],
        )
        .map_err(to_storage_err)?;
    Ok(changed > 0)
}

/// Returns whether a watch was removed.
pub fn remove_watch(conn: &Connection, watch: &BrandWatch) -> Result<bool, StorageError> {
    let changed = conn
        .execute(
            "DELETE FROM brand_watchlist WHERE user = ?1 AND brand = ?2",
            params![watch.user, watch.brand],
        )
        .map_err(to_storage_err)?;
    Ok(changed > 0)
}

/// Distinct watched brands, alphabetical.
pub fn watched_brands(conn: &Connection) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT DISTINCT brand FROM brand_watchlist ORDER BY brand")
        .map_err(to_storage_err)?;
    let rows = stmt.query_map([], |row| row.get(0)).map_err(to_storage_err)?;
    rows.collect::<Result<Vec<String>, _>>().map_err(to_storage_err)
}

/// Users watching `brand`.
pub fn watchers_of(conn: &Connection, brand: &str) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT user FROM brand_watchlist WHERE brand = ?1 ORDER BY user")
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![brand], |row| row.get(0))
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<String>, _>>().map_err(to_storage_err)
}
