//! Field validation for extracted event details.
//!
//! Model output is untrusted: every field is checked independently and
//! replaced with a sensible default when it can't be used, so a partly wrong
//! answer still produces an editable event.

use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]?[0-9]|2[0-3]):([0-5][0-9])$").expect("valid regex"));

/// Date-only layouts tried in order after ISO 8601.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%A, %B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// Normalize a date to `YYYY-MM-DD`, falling back to today's local date.
pub fn validate_date(input: Option<&str>) -> String {
    validate_date_on(input, Local::now().date_naive())
}

pub fn validate_date_on(input: Option<&str>, today: NaiveDate) -> String {
    input
        .and_then(parse_date)
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string()
}

/// Accept a strict 24-hour `H:MM`/`HH:MM` time, falling back to the current
/// local time truncated to the minute.
pub fn validate_time(input: Option<&str>) -> String {
    validate_time_at(input, Local::now().time())
}

pub fn validate_time_at(input: Option<&str>, now: NaiveTime) -> String {
    match input {
        Some(s) if is_valid_time(s) => s.to_string(),
        _ => now.format("%H:%M").to_string(),
    }
}

/// Parse a calendar date from the handful of layouts models tend to produce.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

pub fn is_valid_time(s: &str) -> bool {
    TIME_PATTERN.is_match(s)
}

/// True only for a zero-padded `YYYY-MM-DD` naming a real day.
pub fn is_canonical_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .is_ok_and(|d| d.format("%Y-%m-%d").to_string() == s)
}
