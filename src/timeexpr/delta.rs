//! Signed relative duration parser
//!
//! Grammar:
//!
//! ```text
//! delta     := sign? component+
//! sign      := '+' | '-'
//! component := digit+ unit
//! unit      := 'd' | 'h' | 'ms' | 'm' | 's'
//! ```
//!
//! Component values are summed, then the single leading sign is applied, so
//! `-1h30m` is minus ninety minutes. Surrounding whitespace is ignored; any
//! other character is rejected.

use super::TimeParseError;

type Result<T> = std::result::Result<T, TimeParseError>;

/// Units accepted in a delta component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
    Millis,
}

impl DeltaUnit {
    #[must_use]
    pub const fn millis(self) -> i64 {
        match self {
            Self::Days => 24 * 60 * 60 * 1000,
            Self::Hours => 60 * 60 * 1000,
            Self::Minutes => 60 * 1000,
            Self::Seconds => 1000,
            Self::Millis => 1,
        }
    }

    /// Split a unit off the front of `rest`; `ms` wins over `m`
    fn take(rest: &str) -> Option<(Self, &str)> {
        if let Some(tail) = rest.strip_prefix("ms") {
            return Some((Self::Millis, tail));
        }
        let unit = match rest.as_bytes().first()? {
            b'd' => Self::Days,
            b'h' => Self::Hours,
            b'm' => Self::Minutes,
            b's' => Self::Seconds,
            _ => return None,
        };
        Some((unit, &rest[1..]))
    }
}

/// Parse a delta expression into signed milliseconds
///
/// An empty (or all-whitespace) expression is a zero offset.
///
/// # Examples
/// ```
/// use metanyx::timeexpr::parse_delta;
///
/// assert_eq!(parse_delta("+1h30m").unwrap(), 5_400_000);
/// assert_eq!(parse_delta("-45s").unwrap(), -45_000);
/// assert_eq!(parse_delta("").unwrap(), 0);
/// ```
///
/// # Errors
///
/// Returns [`TimeParseError::UnparsableDelta`] for a sign with no components,
/// a number without a unit, or any unexpected character, and
/// [`TimeParseError::Overflow`] if the total does not fit in an `i64`.
pub fn parse_delta(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    let (negative, body) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let unparsable = |reason: String| TimeParseError::UnparsableDelta {
        input: text.to_string(),
        reason,
    };
    let overflow = || TimeParseError::Overflow(text.to_string());

    if body.is_empty() {
        return Err(unparsable("sign without any component".into()));
    }

    let mut total: i64 = 0;
    let mut rest = body;
    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            let offset = body.len() - rest.len();
            return Err(unparsable(format!(
                "expected a number at position {offset}, found '{}'",
                rest.chars().next().unwrap_or_default()
            )));
        }
        let value: i64 = rest[..digits].parse().map_err(|_| overflow())?;
        rest = &rest[digits..];

        let (unit, tail) = DeltaUnit::take(rest)
            .ok_or_else(|| unparsable(format!("missing unit after '{value}' (use d, h, m, s or ms)")))?;
        rest = tail;

        total = value
            .checked_mul(unit.millis())
            .and_then(|ms| total.checked_add(ms))
            .ok_or_else(overflow)?;
    }

    Ok(if negative { -total } else { total })
}

/// [`parse_delta`] for optional input; `None` is a zero offset
///
/// # Errors
///
/// Same as [`parse_delta`].
pub fn parse_optional_delta(text: Option<&str>) -> Result<i64> {
    text.map_or(Ok(0), parse_delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_positive() {
        assert_eq!(parse_delta("+1h30m").unwrap(), 5_400_000);
    }

    #[test]
    fn test_negative_seconds() {
        assert_eq!(parse_delta("-45s").unwrap(), -45_000);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(parse_delta("").unwrap(), 0);
        assert_eq!(parse_delta("   ").unwrap(), 0);
        assert_eq!(parse_optional_delta(None).unwrap(), 0);
    }

    #[test]
    fn test_sign_defaults_to_plus() {
        assert_eq!(parse_delta("10d").unwrap(), 864_000_000);
    }

    #[test]
    fn test_ms_is_not_minutes() {
        assert_eq!(parse_delta("+500ms").unwrap(), 500);
        assert_eq!(parse_delta("1m500ms").unwrap(), 60_500);
    }

    #[test]
    fn test_sign_applies_to_whole_expression() {
        assert_eq!(parse_delta("-2d3h").unwrap(), -(2 * 86_400_000 + 3 * 3_600_000));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            parse_delta("+1x"),
            Err(TimeParseError::UnparsableDelta { .. })
        ));
        assert!(matches!(
            parse_delta("1h foo"),
            Err(TimeParseError::UnparsableDelta { .. })
        ));
        assert!(matches!(
            parse_delta("-"),
            Err(TimeParseError::UnparsableDelta { .. })
        ));
        assert!(matches!(
            parse_delta("15"),
            Err(TimeParseError::UnparsableDelta { .. })
        ));
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(
            parse_delta("99999999999999999999d"),
            Err(TimeParseError::Overflow(_))
        ));
        assert!(matches!(
            parse_delta("999999999999999d"),
            Err(TimeParseError::Overflow(_))
        ));
    }
}
