//! Schema migrations using PRAGMA user_version.

pub mod v001_thresholds;
pub mod v002_alerts;
pub mod v003_feedback;

use chrono::Utc;
use rusqlite::{params, Connection};
use sentinel_core::errors::StorageError;
use sentinel_core::types::{AlertThreshold, DetectorType};

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current_version = current_version(conn).map_err(|e| StorageError::MigrationFailed {
        version: 0,
        message: e.to_string(),
    })?;

    let migrations: &[(&str, u32)] = &[
        (v001_thresholds::MIGRATION_SQL, 1),
        (v002_alerts::MIGRATION_SQL, 2),
        (v003_feedback::MIGRATION_SQL, 3),
    ];

    for (sql, version) in migrations {
        if current_version < *version {
            conn.execute_batch(sql)
                .map_err(|e| StorageError::MigrationFailed {
                    version: *version,
                    message: e.to_string(),
                })?;

            if *version == 1 {
                seed_thresholds(conn).map_err(|e| StorageError::MigrationFailed {
                    version: *version,
                    message: e.to_string(),
                })?;
            }

            conn.pragma_update(None, "user_version", version)
                .map_err(|e| StorageError::MigrationFailed {
                    version: *version,
                    message: e.to_string(),
                })?;
            tracing::info!(version = version, "applied migration");
        }
    }

    Ok(())
}

/// Get the current schema version.
pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}

/// One row per detector type at its compiled default.
fn seed_thresholds(conn: &Connection) -> Result<(), rusqlite::Error> {
    let now = Utc::now();
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO alert_thresholds
            (detector_type, default_value, current_value, lower_bound, upper_bound, last_updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for detector_type in DetectorType::all() {
        let t = AlertThreshold::seeded(*detector_type, now);
        stmt.execute(params![
            t.detector_type.as_str(),
            t.default_value,
            t.current_value,
            t.lower_bound,
            t.upper_bound,
            t.last_updated.timestamp(),
        ])?;
    }
    Ok(())
}
