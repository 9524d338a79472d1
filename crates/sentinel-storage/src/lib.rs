//! sentinel-storage: SQLite persistence for the Sentinel signal engine.
//!
//! One serialized writer plus a round-robin read pool, `PRAGMA user_version`
//! migrations, free query functions per table, and the `StorageEngine`
//! facade the runtime talks to.

pub mod connection;
pub mod cooldown;
pub mod engine;
pub mod migrations;
pub mod queries;

pub use connection::DatabaseManager;
pub use cooldown::SqliteCooldownLedger;
pub use engine::{StorageEngine, ThresholdChange};

use sentinel_core::errors::StorageError;

/// Wrap any displayable failure as a generic SQLite storage error.
pub(crate) fn to_storage_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}
