//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application:
//! lenient date parsing for request payloads, age arithmetic and input checks.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::utils::errors::{ChurchAdminError, Result};

/// Parse a calendar date given either as `YYYY-MM-DD` or as an RFC 3339 timestamp
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| ChurchAdminError::validation(format!("Invalid date: {}", input)))
}

/// Parse a timestamp given either as RFC 3339 or as a bare `YYYY-MM-DD` (midnight UTC)
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| ChurchAdminError::validation(format!("Invalid date: {}", input)))
}

/// Serde adapter for required [`NaiveDate`] fields
pub fn de_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

/// Serde adapter for optional [`NaiveDate`] fields; empty strings read as `None`
pub fn de_opt_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => parse_date(&raw).map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Serde adapter for clearable fields of partial updates.
/// Paired with `#[serde(default)]`: absent stays `None`, `null` becomes `Some(None)`.
pub fn de_patch<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Clearable [`NaiveDate`] of a partial update; `null` and empty strings clear it
pub fn de_patch_date<'de, D>(deserializer: D) -> std::result::Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    de_opt_date(deserializer).map(Some)
}

/// Serde adapter for required [`DateTime<Utc>`] fields
pub fn de_datetime<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime(&raw).map_err(serde::de::Error::custom)
}

/// Serde adapter for optional [`DateTime<Utc>`] fields
pub fn de_opt_datetime<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => parse_datetime(&raw).map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Age in whole years on `today`; `None` for birth dates in the future
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if date_of_birth > today {
        return None;
    }
    let mut years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// `(year, month)` bucket key of a date
pub fn year_month(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"))
}

/// Basic shape check for an e-mail address
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Trim a free-text field and drop it when nothing is left
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim a clearable text field; blank input clears it
pub fn normalize_patch(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(normalize_optional)
}

/// Number of pages needed for `total` items at `limit` per page
pub fn page_count(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}
