//! Database query modules.
//!
//! - movies: catalog CRUD, listing, search and suggestions
//! - admins: admin account management

pub mod admins;
pub mod movies;

use rusqlite::types::Type;

/// Wrap a column decode failure so it surfaces as a rusqlite row error.
pub(crate) fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, err.into())
}

/// Parse an RFC 3339 timestamp column.
pub(crate) fn parse_timestamp(
    column: usize,
    value: &str,
) -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| conversion_error(column, e))
}
