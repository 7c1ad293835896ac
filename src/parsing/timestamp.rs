//! Timestamp parsing for WhatsApp TXT exports.
//!
//! Android exports prefix every message with a locale-formatted date and
//! time. Three conventions are recognized, tried in this order:
//!
//! | Format | Example |
//! |--------|---------|
//! | [`TimestampFormat::EuDot`] | `26.10.2025, 20:40` |
//! | [`TimestampFormat::EuSlash`] | `26/10/2025, 20:40` |
//! | [`TimestampFormat::EuSlashShort`] | `26/10/25, 20:40` |
//!
//! Day/month order is never guessed: the first format that parses wins.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use crate::error::{ChatscrollError, Result};

/// Pattern for a timestamp prefix as it appears at the start of a record,
/// before the `" - "` separator. Matches all three formats.
pub const TIMESTAMP_PREFIX: &str = r"\d{1,2}[./]\d{1,2}[./]\d{2,4},\s*\d{1,2}:\d{2}";

/// Known timestamp conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampFormat {
    /// Day, month and four-digit year separated by dots, 24h clock.
    /// Example: `26.10.2025, 20:40`
    EuDot,
    /// Day, month and four-digit year separated by slashes, 24h clock.
    /// Example: `26/10/2025, 20:40`
    EuSlash,
    /// Day, month and two-digit year separated by slashes, 24h clock.
    /// Example: `26/10/25, 20:40`
    EuSlashShort,
}

impl TimestampFormat {
    /// Returns the shape this format accepts.
    ///
    /// Checked before chrono parsing so that a four-digit year format never
    /// swallows a two-digit year.
    pub fn pattern(self) -> &'static str {
        match self {
            TimestampFormat::EuDot => r"^\d{1,2}\.\d{1,2}\.\d{4},\s*\d{1,2}:\d{2}$",
            TimestampFormat::EuSlash => r"^\d{1,2}/\d{1,2}/\d{4},\s*\d{1,2}:\d{2}$",
            TimestampFormat::EuSlashShort => r"^\d{1,2}/\d{1,2}/\d{2},\s*\d{1,2}:\d{2}$",
        }
    }

    /// Returns the chrono format string.
    pub fn chrono_format(self) -> &'static str {
        match self {
            TimestampFormat::EuDot => "%d.%m.%Y, %H:%M",
            TimestampFormat::EuSlash => "%d/%m/%Y, %H:%M",
            TimestampFormat::EuSlashShort => "%d/%m/%y, %H:%M",
        }
    }

    /// Returns all formats in attempt order.
    pub fn all() -> &'static [TimestampFormat] {
        &[
            TimestampFormat::EuDot,
            TimestampFormat::EuSlash,
            TimestampFormat::EuSlashShort,
        ]
    }

    /// Parses `input` with this format only.
    pub fn parse(self, input: &str) -> Option<DateTime<Utc>> {
        let shape = &SHAPES[self.index()];
        if !shape.is_match(input) {
            return None;
        }
        NaiveDateTime::parse_from_str(input, self.chrono_format())
            .ok()
            .map(|naive| naive.and_utc())
    }

    fn index(self) -> usize {
        match self {
            TimestampFormat::EuDot => 0,
            TimestampFormat::EuSlash => 1,
            TimestampFormat::EuSlashShort => 2,
        }
    }
}

impl std::fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.chrono_format())
    }
}

static SHAPES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    TimestampFormat::all()
        .iter()
        .map(|format| Regex::new(format.pattern()).unwrap())
        .collect()
});

/// Parses a timestamp, trying every known format in order.
///
/// Leading and trailing whitespace is ignored.
///
/// # Errors
///
/// Returns [`ChatscrollError::Format`] if no format matches.
///
/// # Example
///
/// ```rust
/// use chatscroll::parsing::parse_timestamp;
/// use chrono::{TimeZone, Utc};
///
/// let ts = parse_timestamp(" 1.7.2025, 10:12 ")?;
/// assert_eq!(ts, Utc.with_ymd_and_hms(2025, 7, 1, 10, 12, 0).unwrap());
///
/// assert!(parse_timestamp("yesterday").is_err());
/// # Ok::<(), chatscroll::ChatscrollError>(())
/// ```
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    match_timestamp(input).map(|(ts, _)| ts)
}

/// Like [`parse_timestamp`], also reporting which format matched.
pub fn match_timestamp(input: &str) -> Result<(DateTime<Utc>, TimestampFormat)> {
    let trimmed = input.trim();
    TimestampFormat::all()
        .iter()
        .find_map(|&format| format.parse(trimmed).map(|ts| (ts, format)))
        .ok_or_else(|| ChatscrollError::format(input))
}
