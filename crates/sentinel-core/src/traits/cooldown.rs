//! Cooldown reservation ledger.

use chrono::{DateTime, Utc};

use crate::errors::StorageError;
use crate::types::CooldownKey;

/// Outcome of a reservation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reservation {
    /// The caller now owns the key until it expires.
    Granted,
    /// Another alert already holds the key.
    Held { alert_id: String },
}

impl Reservation {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Atomic check-and-reserve over cooldown keys.
///
/// For a given key at most one concurrent `reserve` returns `Granted`
/// until the key's window has passed.
pub trait CooldownLedger: Send + Sync {
    fn reserve(
        &self,
        key: &CooldownKey,
        alert_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Reservation, StorageError>;

    /// Drop a reservation, e.g. when the alert that owned it failed to persist.
    fn release(&self, key: &CooldownKey) -> Result<(), StorageError>;
}
