//! In-process cooldown ledger.
//!
//! Reservations live in a `DashMap`; the entry API holds the shard lock for
//! the check-and-insert, so a key is granted at most once per window. State
//! does not survive a restart, which is why the SQLite ledger is the default.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use sentinel_core::errors::StorageError;
use sentinel_core::traits::{CooldownLedger, Reservation};
use sentinel_core::types::CooldownKey;

#[derive(Debug, Clone)]
struct Hold {
    alert_id: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct MemoryCooldownLedger {
    holds: DashMap<String, Hold>,
}

impl MemoryCooldownLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.holds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holds.is_empty()
    }

    /// Drop every hold that expired at or before `now`.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.holds.len();
        self.holds.retain(|_, hold| hold.expires_at > now);
        before.saturating_sub(self.holds.len())
    }
}

impl CooldownLedger for MemoryCooldownLedger {
    fn reserve(
        &self,
        key: &CooldownKey,
        alert_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Reservation, StorageError> {
        let hold = Hold {
            alert_id: alert_id.to_string(),
            expires_at: key.expires_at(),
        };
        match self.holds.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().expires_at > now {
                    Ok(Reservation::Held {
                        alert_id: occupied.get().alert_id.clone(),
                    })
                } else {
                    occupied.insert(hold);
                    Ok(Reservation::Granted)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(hold);
                Ok(Reservation::Granted)
            }
        }
    }

    fn release(&self, key: &CooldownKey) -> Result<(), StorageError> {
        self.holds.remove(&key.to_string());
        Ok(())
    }
}
