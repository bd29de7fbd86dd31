//! Row-to-entity parsing helpers.
//!
//! Every repo needs to convert `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing logic: datetimes in either
//! RFC 3339 or `SQLite`'s `datetime('now')` format, closed enums stored as
//! TEXT, and small integers / booleans stored as INTEGER.

use chrono::{DateTime, Utc};

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Read a nullable datetime column.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read or parse fails.
pub fn get_opt_datetime(
    row: &libsql::Row,
    idx: i32,
) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    parse_optional_datetime(get_opt_string(row, idx)?.as_deref())
}

/// Render an optional timestamp for binding as a TEXT parameter.
#[must_use]
pub fn opt_rfc3339(dt: Option<DateTime<Utc>>) -> Option<String> {
    dt.map(|d| d.to_rfc3339())
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all haven-core enums (`snake_case` or `SCREAMING_SNAKE_CASE`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Parse a nullable TEXT column into an enum.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails or the value is not a variant.
pub fn get_opt_enum<T: serde::de::DeserializeOwned>(
    row: &libsql::Row,
    idx: i32,
) -> Result<Option<T>, DatabaseError> {
    get_opt_string(row, idx)?
        .map(|s| parse_enum(&s))
        .transpose()
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// You must use `get::<Option<String>>()` for nullable columns.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read a required INTEGER column holding a 0-255 value (scores, intensities).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the stored value is out of range.
pub fn get_u8(row: &libsql::Row, idx: i32) -> Result<u8, DatabaseError> {
    let v = row.get::<i64>(idx)?;
    u8::try_from(v).map_err(|_| DatabaseError::Query(format!("column {idx}: {v} out of range")))
}

/// Read a nullable INTEGER column holding a 0-255 value.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the stored value is out of range.
pub fn get_opt_u8(row: &libsql::Row, idx: i32) -> Result<Option<u8>, DatabaseError> {
    row.get::<Option<i64>>(idx)?
        .map(|v| {
            u8::try_from(v)
                .map_err(|_| DatabaseError::Query(format!("column {idx}: {v} out of range")))
        })
        .transpose()
}

/// Read a required non-negative INTEGER column as `u32`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the stored value is negative or too large.
pub fn get_u32(row: &libsql::Row, idx: i32) -> Result<u32, DatabaseError> {
    let v = row.get::<i64>(idx)?;
    u32::try_from(v).map_err(|_| DatabaseError::Query(format!("column {idx}: {v} out of range")))
}

/// Read a nullable non-negative INTEGER column as `u32`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the stored value is negative or too large.
pub fn get_opt_u32(row: &libsql::Row, idx: i32) -> Result<Option<u32>, DatabaseError> {
    row.get::<Option<i64>>(idx)?
        .map(|v| {
            u32::try_from(v)
                .map_err(|_| DatabaseError::Query(format!("column {idx}: {v} out of range")))
        })
        .transpose()
}

/// Read an INTEGER 0/1 column as `bool`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_bool(row: &libsql::Row, idx: i32) -> Result<bool, DatabaseError> {
    Ok(row.get::<i64>(idx)? != 0)
}

/// Extract an optional JSON value from a TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string contains invalid JSON.
pub fn parse_optional_json(s: Option<&str>) -> Result<Option<serde_json::Value>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => {
            let val = serde_json::from_str(s)
                .map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}")))?;
            Ok(Some(val))
        }
        _ => Ok(None),
    }
}

/// Serialize a value for a JSON TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if serialization fails.
pub fn to_json_text<T: serde::Serialize>(value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::Other(e.into()))
}
