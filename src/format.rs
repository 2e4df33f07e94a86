//! Display formatting for dates and times (en-US conventions).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{ErrorKind, Result};

/// What a browser shows for a date it could not parse.
pub const INVALID_DATE: &str = "Invalid Date";

/// "2024-01-05" -> "Fri, Jan 5, 2024".
///
/// Accepts a bare calendar date, an RFC 3339 timestamp, or a naive
/// `YYYY-MM-DD[T ]HH:MM:SS` timestamp. Timestamps keep the calendar day they
/// were written in; nothing is shifted into the local timezone.
pub fn format_date(input: &str) -> Result<String> {
    let date = parse_calendar_date(input.trim())
        .ok_or_else(|| ErrorKind::ParseError(format!("invalid date {input:?}")))?;
    Ok(date.format("%a, %b %-d, %Y").to_string())
}

fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(s) {
        return Some(stamp.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|stamp| stamp.date())
}

/// "14:30" -> "2:30 PM", "09:05" -> "9:05 AM".
///
/// Only the hour and minute fields are read; a trailing seconds field is ignored.
pub fn format_time(input: &str) -> Result<String> {
    let mut fields = input.trim().split(':');
    let hours = clock_field(fields.next(), "hour", input)?;
    let minutes = clock_field(fields.next(), "minute", input)?;

    let time = NaiveTime::from_hms_opt(hours, minutes, 0)
        .ok_or_else(|| ErrorKind::ParseError(format!("time out of range {input:?}")))?;

    Ok(time.format("%-I:%M %p").to_string())
}

fn clock_field(field: Option<&str>, name: &str, input: &str) -> Result<u32> {
    field
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .and_then(|f| f.parse::<u32>().ok())
        .ok_or_else(|| ErrorKind::ParseError(format!("missing {name} in {input:?}")).into())
}
