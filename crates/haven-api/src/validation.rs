//! Input validation helpers.
//!
//! Enumerations are validated by serde during deserialization; these cover
//! ranges, required text, email shape, and date inputs.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ApiError;

/// Mood, energy, anxiety, and intensity scores are 1-10 inclusive.
pub fn check_score(field: &str, value: u8) -> Result<(), ApiError> {
    if (1..=10).contains(&value) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "{field} must be between 1 and 10"
        )))
    }
}

pub fn check_opt_score(field: &str, value: Option<u8>) -> Result<(), ApiError> {
    value.map_or(Ok(()), |v| check_score(field, v))
}

pub fn check_sleep_hours(value: Option<f64>) -> Result<(), ApiError> {
    match value {
        Some(v) if !(0.0..=24.0).contains(&v) => Err(ApiError::BadRequest(
            "sleepHours must be between 0 and 24".into(),
        )),
        _ => Ok(()),
    }
}

pub fn check_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::BadRequest(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

/// `local@domain.tld` with no whitespace.
pub fn check_email(field: &str, value: &str) -> Result<(), ApiError> {
    let valid = !value.chars().any(char::is_whitespace)
        && value.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        });
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("{field} must be a valid email")))
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date_input(field: &str, value: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ApiError::BadRequest(format!("{field} must be a date")))
}

pub fn parse_opt_date_input(
    field: &str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    value.map(|v| parse_date_input(field, v)).transpose()
}
