//! Database configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file. Default: `.sentinel/sentinel.db` under the project root.
    pub db_path: Option<PathBuf>,
    /// Read connections in the pool. Default: 4, max 8.
    pub read_pool_size: Option<usize>,
}

impl StorageConfig {
    pub fn effective_read_pool_size(&self) -> usize {
        self.read_pool_size.unwrap_or(4).clamp(1, 8)
    }

    pub fn effective_db_path(&self, root: &std::path::Path) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| root.join(".sentinel").join("sentinel.db"))
    }
}
