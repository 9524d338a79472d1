//! Cooldown/dedup configuration.
//!
//! Windows are fixed per detector class (see `DetectorClass::cooldown_secs`);
//! only the reservation backend is configurable.

use serde::{Deserialize, Serialize};

/// Where cooldown reservations live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CooldownBackend {
    /// Durable reservations in the SQLite database.
    #[default]
    Sqlite,
    /// Process-local reservations. Lost on restart.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CooldownConfig {
    pub backend: Option<CooldownBackend>,
}

impl CooldownConfig {
    pub fn effective_backend(&self) -> CooldownBackend {
        self.backend.unwrap_or_default()
    }
}
