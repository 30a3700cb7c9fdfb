//! Absolute point-in-time parser
//!
//! Accepted forms, all interpreted in local time unless they carry an offset:
//! - `YYYY-MM-DD`
//! - `YYYY-MM-DD HH:MM` / `YYYY-MM-DDTHH:MM`
//! - `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`
//! - `now`
//! - fallbacks: RFC 3339, RFC 2822, `YYYY-MM-DD HH:MM:SS.fff`, `YYYY/MM/DD`
//!
//! Omitted precision is completed by the [`Bound`]: `From` picks the first
//! millisecond of the omitted span, `To` the last one, so a date used as an
//! upper bound covers the whole day.

use super::{Bound, TimeParseError};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use regex::Regex;
use std::sync::LazyLock;

type Result<T> = std::result::Result<T, TimeParseError>;

static SHORT_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T](\d{1,2}):(\d{2})(?::(\d{2}))?)?$")
        .expect("static regex is valid")
});

/// Precision present in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precision {
    Day,
    Minute,
    Second,
}

/// Parse `text` into epoch milliseconds, completing omitted precision per `bound`
///
/// # Examples
/// ```
/// use metanyx::timeexpr::{Bound, parse_absolute};
///
/// let start = parse_absolute("2024-10-01", Bound::From).unwrap();
/// let end = parse_absolute("2024-10-01", Bound::To).unwrap();
/// assert_eq!(end - start, 86_400_000 - 1);
/// ```
///
/// # Errors
///
/// Returns [`TimeParseError::UnparsableAbsolute`] if no accepted form matches,
/// the calendar values are invalid, or the local time does not exist (DST gap).
pub fn parse_absolute(text: &str, bound: Bound) -> Result<i64> {
    parse_absolute_at(text, bound, Local::now())
}

/// [`parse_absolute`] with an explicit value for `now`
///
/// # Errors
///
/// Same as [`parse_absolute`].
pub fn parse_absolute_at(text: &str, bound: Bound, now: DateTime<Local>) -> Result<i64> {
    let trimmed = text.trim();
    let unparsable = || TimeParseError::UnparsableAbsolute(text.to_string());

    if trimmed.is_empty() {
        return Err(unparsable());
    }
    if trimmed.eq_ignore_ascii_case("now") {
        return Ok(now.timestamp_millis());
    }

    if let Some(caps) = SHORT_FORM.captures(trimmed) {
        let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        let year = caps[1].parse::<i32>().map_err(|_| unparsable())?;
        let (month, day) = (num(2).ok_or_else(unparsable)?, num(3).ok_or_else(unparsable)?);
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(unparsable)?;

        let (precision, hour, minute, second) = match (num(4), num(5), num(6)) {
            (Some(h), Some(m), Some(s)) => (Precision::Second, h, m, s),
            (Some(h), Some(m), None) => (Precision::Minute, h, m, 0),
            _ => (Precision::Day, 0, 0, 0),
        };

        let naive = complete(date, precision, hour, minute, second, bound).ok_or_else(unparsable)?;
        return to_local_millis(&naive, bound).ok_or_else(unparsable);
    }

    fallback(trimmed, bound).ok_or_else(unparsable)
}

fn complete(
    date: NaiveDate,
    precision: Precision,
    hour: u32,
    minute: u32,
    second: u32,
    bound: Bound,
) -> Option<NaiveDateTime> {
    let time = match (precision, bound) {
        (Precision::Day, Bound::From) => NaiveTime::from_hms_milli_opt(0, 0, 0, 0),
        (Precision::Day, Bound::To) => NaiveTime::from_hms_milli_opt(23, 59, 59, 999),
        (Precision::Minute, Bound::From) => NaiveTime::from_hms_milli_opt(hour, minute, 0, 0),
        (Precision::Minute, Bound::To) => NaiveTime::from_hms_milli_opt(hour, minute, 59, 999),
        (Precision::Second, Bound::From) => NaiveTime::from_hms_milli_opt(hour, minute, second, 0),
        (Precision::Second, Bound::To) => {
            NaiveTime::from_hms_milli_opt(hour, minute, second, 999)
        }
    }?;
    Some(date.and_time(time))
}

/// Local wall time to epoch ms; ambiguous times resolve toward the bound
fn to_local_millis(naive: &NaiveDateTime, bound: Bound) -> Option<i64> {
    let resolved = Local.from_local_datetime(naive);
    let instant = match bound {
        Bound::From => resolved.earliest(),
        Bound::To => resolved.latest(),
    }?;
    Some(instant.timestamp_millis())
}

fn fallback(text: &str, bound: Bound) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return to_local_millis(&naive, bound);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y/%m/%d") {
        let naive = complete(date, Precision::Day, 0, 0, 0, bound)?;
        return to_local_millis(&naive, bound);
    }
    None
}
