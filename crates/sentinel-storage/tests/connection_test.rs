//! Connection, pragma and migration tests.

use sentinel_storage::connection::pragmas;
use sentinel_storage::connection::DatabaseManager;
use sentinel_storage::migrations::{current_version, run_migrations};
use tempfile::tempdir;

/// TS-CON-01: a file database runs in WAL mode with a read pool.
#[test]
fn test_file_database_wal_and_pool() {
    let dir = tempdir().unwrap();
    let db = DatabaseManager::open(&dir.path().join("nested").join("sentinel.db"), 3).unwrap();
    assert_eq!(db.read_pool_size(), 3);
    let wal = db.with_writer(pragmas::verify_wal_mode).unwrap();
    assert!(wal);
    db.checkpoint().unwrap();
}

/// TS-CON-02: migrations reach the latest version and are idempotent.
#[test]
fn test_migrations_idempotent() {
    let db = DatabaseManager::open_in_memory().unwrap();
    db.with_writer(|conn| {
        assert_eq!(current_version(conn)?, 3);
        run_migrations(conn)?;
        assert_eq!(current_version(conn)?, 3);
        Ok(())
    })
    .unwrap();
}

/// TS-CON-03: the first migration seeds one threshold row per detector.
#[test]
fn test_thresholds_seeded() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let count: i64 = db
        .with_reader(|conn| {
            conn.query_row("SELECT COUNT(*) FROM alert_thresholds", [], |row| row.get(0))
                .map_err(|e| sentinel_core::errors::StorageError::SqliteError {
                    message: e.to_string(),
                })
        })
        .unwrap();
    assert_eq!(count, 21);
}

/// TS-CON-04: read connections see committed writes on file databases.
#[test]
fn test_readers_see_writer() {
    let dir = tempdir().unwrap();
    let db = DatabaseManager::open(&dir.path().join("sentinel.db"), 2).unwrap();
    db.with_writer(|conn| {
        conn.execute(
            "INSERT INTO brand_watchlist (user, brand, created_at) VALUES ('u1', 'Acme', 0)",
            [],
        )
        .map(|_| ())
        .map_err(|e| sentinel_core::errors::StorageError::SqliteError {
            message: e.to_string(),
        })
    })
    .unwrap();

    for _ in 0..4 {
        let brands = db
            .with_reader(sentinel_storage::queries::watchlist::watched_brands)
            .unwrap();
        assert_eq!(brands, vec!["Acme".to_string()]);
    }
}

/// TS-CON-05: pooled readers refuse writes.
#[test]
fn test_readers_are_query_only() {
    let dir = tempdir().unwrap();
    let db = DatabaseManager::open(&dir.path().join("sentinel.db"), 1).unwrap();
    let result = db.with_reader(|conn| {
        conn.execute("DELETE FROM alert_thresholds", [])
            .map_err(|e| sentinel_core::errors::StorageError::SqliteError {
                message: e.to_string(),
            })
    });
    assert!(result.is_err());
}
