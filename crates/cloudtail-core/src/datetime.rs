//! Time expression parsing.
//!
//! Turns the start/end expressions users pass on the command line into
//! epoch-millisecond bounds: relative offsets like `5m` or `2 hours ago`,
//! or absolute dates in a handful of common formats.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::error::{CloudtailError, Result};

/// Relative offsets: `<amount><unit>`, optionally space-separated and with
/// a trailing `ago`. Anchored on both ends so `5months` is rejected rather
/// than silently read as `5m`.
const RELATIVE_PATTERN: &str =
    r"^(\d+)\s?(m|minute|minutes|h|hour|hours|d|day|days|w|week|weeks)(?: ago)?$";

/// Absolute formats tried in order, most specific first.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Parse a time expression against the current wall clock.
///
/// Returns `Ok(None)` for empty input, meaning no bound at all.
pub fn parse(text: &str) -> Result<Option<i64>> {
    parse_at(text, Utc::now())
}

/// Parse a time expression against an explicit "now".
///
/// The result is whole-second milliseconds since the Unix epoch: sub-second
/// precision is truncated, matching the coarse granularity the filter API
/// works at.
pub fn parse_at(text: &str, now: DateTime<Utc>) -> Result<Option<i64>> {
    if text.is_empty() {
        return Ok(None);
    }

    static RELATIVE: OnceLock<Regex> = OnceLock::new();
    let relative = RELATIVE.get_or_init(|| Regex::new(RELATIVE_PATTERN).unwrap());

    let parsed = if let Some(caps) = relative.captures(text) {
        let amount: i64 = caps[1].parse().map_err(|_| unknown(text))?;
        // The pattern only admits m/h/d/w units; the first letter is enough.
        let unit_seconds = match &caps[2][..1] {
            "m" => 60,
            "h" => 3_600,
            "d" => 86_400,
            _ => 604_800,
        };
        let offset = amount
            .checked_mul(unit_seconds)
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| unknown(text))?;
        now.checked_sub_signed(offset).ok_or_else(|| unknown(text))?
    } else {
        parse_absolute(text).ok_or_else(|| unknown(text))?
    };

    Ok(Some(parsed.timestamp() * 1000))
}

fn parse_absolute(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(fixed) = DateTime::parse_from_rfc3339(text) {
        return Some(fixed.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }
    None
}

fn unknown(text: &str) -> CloudtailError {
    CloudtailError::UnknownDateFormat(text.to_string())
}
