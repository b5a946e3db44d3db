// ABOUTME: Column decoding helpers shared by the storage packages
// ABOUTME: Reads canonical timestamps and JSON documents out of SQLite rows

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::{SqlxResultExt, StorageError, StorageResult};

/// Read a timestamp column written with `sentinel_core::format_timestamp`
pub fn read_timestamp(row: &SqliteRow, column: &'static str) -> StorageResult<DateTime<Utc>> {
    let raw: String = row.try_get(column).context("decoding row")?;
    sentinel_core::parse_timestamp(&raw).map_err(|_| StorageError::Corrupt { column, value: raw })
}

/// Read a nullable timestamp column
pub fn read_optional_timestamp(
    row: &SqliteRow,
    column: &'static str,
) -> StorageResult<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.try_get(column).context("decoding row")?;
    raw.map(|value| {
        sentinel_core::parse_timestamp(&value)
            .map_err(|_| StorageError::Corrupt { column, value })
    })
    .transpose()
}

/// Read a TEXT column holding a serialized JSON document
pub fn read_json<T: DeserializeOwned>(row: &SqliteRow, column: &'static str) -> StorageResult<T> {
    let raw: String = row.try_get(column).context("decoding row")?;
    Ok(serde_json::from_str(&raw)?)
}
