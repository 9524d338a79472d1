//! Durable cooldown ledger backed by `cooldown_reservations`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sentinel_core::errors::StorageError;
use sentinel_core::traits::{CooldownLedger, Reservation};
use sentinel_core::types::CooldownKey;

use crate::connection::writer::with_immediate_transaction;
use crate::connection::DatabaseManager;
use crate::queries::cooldown;

/// Reservations survive restarts and are shared by every process using the
/// same database file. Each `reserve` runs in its own immediate transaction,
/// so the check and the insert cannot interleave with another writer.
pub struct SqliteCooldownLedger {
    db: Arc<DatabaseManager>,
}

impl SqliteCooldownLedger {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Remove all expired reservations.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StorageError> {
        self.db
            .with_writer(|conn| cooldown::purge_expired(conn, now.timestamp()))
    }
}

impl CooldownLedger for SqliteCooldownLedger {
    fn reserve(
        &self,
        key: &CooldownKey,
        alert_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Reservation, StorageError> {
        let key_text = key.to_string();
        let now_ts = now.timestamp();
        let expires_at = key.expires_at().timestamp();

        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                cooldown::delete_expired_key(tx, &key_text, now_ts)?;
                if cooldown::try_insert(tx, &key_text, alert_id, now_ts, expires_at)? {
                    return Ok(Reservation::Granted);
                }
                let holder = cooldown::holder(tx, &key_text)?.unwrap_or_default();
                Ok(Reservation::Held { alert_id: holder })
            })
        })
    }

    fn release(&self, key: &CooldownKey) -> Result<(), StorageError> {
        let key_text = key.to_string();
        self.db.with_writer(|conn| {
            cooldown::delete_key(conn, &key_text)?;
            Ok(())
        })
    }
}
