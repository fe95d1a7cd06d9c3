//! Term ordering by date field.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::Term;

/// Naive date-time formats, taken as UTC.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Naive date formats accepted for date fields, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%B %d, %Y"];

/// Parse a raw date field value into a Unix timestamp.
///
/// Naive values are taken as UTC midnight. Returns `None` for anything that
/// does not parse.
pub fn parse_date(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.and_utc().timestamp());
    }

    // Custom fields store dates as Ymd by default
    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        let year = raw[0..4].parse().ok()?;
        let month = raw[4..6].parse().ok()?;
        let day = raw[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day).map(midnight_timestamp);
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(midnight_timestamp)
}

fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0)
}

/// Sort key for a term: its date timestamp, or the epoch when missing.
pub fn sort_timestamp(term: &Term) -> i64 {
    term.date.as_deref().and_then(parse_date).unwrap_or(0)
}

/// Sort terms into grid order: newest first, ties by ascending id.
pub fn sort_terms(terms: &mut [Term]) {
    terms.sort_by_cached_key(|t| (std::cmp::Reverse(sort_timestamp(t)), t.id));
}
