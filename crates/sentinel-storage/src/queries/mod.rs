//! Query functions, one module per table.

pub mod alerts;
pub mod competitive;
pub mod cooldown;
pub mod feedback;
pub mod pipeline_runs;
pub mod situations;
pub mod snapshots;
pub mod thresholds;
pub mod watchlist;

use chrono::{DateTime, NaiveDate, Utc};
use sentinel_core::errors::StorageError;

/// Unix seconds back to UTC, rejecting out-of-range values as corruption.
pub(crate) fn from_unix(table: &'static str, secs: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| StorageError::CorruptRow {
        table,
        message: format!("timestamp out of range: {secs}"),
    })
}

pub(crate) fn parse_date(table: &'static str, text: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| StorageError::CorruptRow {
        table,
        message: format!("bad date {text:?}: {e}"),
    })
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn from_json<T: serde::de::DeserializeOwned>(
    table: &'static str,
    text: &str,
) -> Result<T, StorageError> {
    serde_json::from_str(text).map_err(|e| StorageError::CorruptRow {
        table,
        message: e.to_string(),
    })
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(crate::to_storage_err)
}
