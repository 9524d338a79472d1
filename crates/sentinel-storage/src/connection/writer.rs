//! Write helpers: BEGIN IMMEDIATE transactions.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use sentinel_core::errors::StorageError;

/// Run `f` inside a `BEGIN IMMEDIATE` transaction.
///
/// The write lock is taken at BEGIN, so concurrent writers queue on
/// busy_timeout instead of failing at COMMIT. Any error from `f` rolls the
/// transaction back; `E` lets callers abort with their own error type.
pub fn with_immediate_transaction<F, T, E>(conn: &Connection, f: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<StorageError>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map_err(|e| {
        if is_busy(&e) {
            StorageError::Busy {
                message: e.to_string(),
            }
        } else {
            StorageError::SqliteError {
                message: format!("failed to begin immediate transaction: {e}"),
            }
        }
    })?;

    let result = f(&tx)?;

    tx.commit().map_err(|e| StorageError::SqliteError {
        message: format!("failed to commit: {e}"),
    })?;

    Ok(result)
}

fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked)
    )
}
