//! Time expression parsing
//!
//! Two independent, pure grammars:
//! - [`parse_absolute`]: a point in time (`2024-10-01`, `2024-10-01 12:30`,
//!   `2024-10-01T12:30:15`, `now`, RFC 3339, ...) completed to a concrete
//!   instant according to a [`Bound`]
//! - [`parse_delta`]: a signed, composable duration (`+1h30m`, `-45s`, `500ms`)
//!
//! Both return epoch-millisecond values (`i64`) and fail with
//! [`TimeParseError`] on malformed input; there is no silent fallback value.

mod absolute;
mod delta;

pub use absolute::{parse_absolute, parse_absolute_at};
pub use delta::{DeltaUnit, parse_delta, parse_optional_delta};

use thiserror::Error;

/// Which end of an under-specified time an absolute expression resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Start of the smallest omitted unit (`00:00:00.000`)
    From,
    /// End of the smallest omitted unit (`23:59:59.999`)
    To,
}

/// Errors from either time grammar
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    /// Absolute expression matched none of the accepted formats
    #[error("Unparsable time expression '{0}'")]
    UnparsableAbsolute(String),

    /// Delta expression violates `[+-]?(<digits><d|h|m|s|ms>)+`
    #[error("Unparsable delta expression '{input}': {reason}")]
    UnparsableDelta { input: String, reason: String },

    /// Delta expression does not fit in 64-bit milliseconds
    #[error("Delta expression '{0}' is out of range")]
    Overflow(String),
}
