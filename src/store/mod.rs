//! SQLite-backed record store for the catalog and student activity.
//!
//! The scorer never talks to the database; callers read snapshots from here
//! and pass plain values to [`crate::score::Recommender`].

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Connection;
use std::path::Path;

mod catalog;
pub mod schema;
mod students;

pub use catalog::read_course_file;
pub use schema::SCHEMA_VERSION;

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the database at `path`, creating it and its parent directory if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store directory {}", parent.display()))?;
        }
        let conn = schema::open_or_create(path)
            .with_context(|| format!("Failed to open store {}", path.display()))?;
        tracing::debug!("Opened store {}", path.display());
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Fixed-width RFC 3339 so stored timestamps sort lexicographically.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Corrupt text column `column` surfaces as a row-mapping error.
pub(crate) fn bad_column(
    column: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, err.into())
}

pub(crate) fn parse_timestamp(value: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| bad_column(column, e))
}

pub(crate) fn parse_json_column<T: serde::de::DeserializeOwned>(
    value: &str,
    column: usize,
) -> rusqlite::Result<T> {
    serde_json::from_str(value).map_err(|e| bad_column(column, e))
}
