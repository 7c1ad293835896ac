//! Filter and search messages.
//!
//! This module provides [`FilterConfig`] for narrowing a chat down by date
//! range and user, [`apply_filters`] to apply it, and [`search_messages`]
//! for regex search over message text.
//!
//! # Filter Types
//!
//! | Filter | Method | Description |
//! |--------|--------|-------------|
//! | Date from | [`with_date_from`](FilterConfig::with_date_from) | Messages on or after date |
//! | Date to | [`with_date_to`](FilterConfig::with_date_to) | Messages on or before date |
//! | User | [`with_user`](FilterConfig::with_user) | Messages from a specific user |
//!
//! # Examples
//!
//! ```
//! use chatscroll::core::filter::{FilterConfig, apply_filters};
//! use chatscroll::Message;
//! use chrono::{TimeZone, Utc};
//!
//! # fn main() -> chatscroll::Result<()> {
//! let messages = vec![
//!     Message::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(), "Alice", "Old"),
//!     Message::new(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(), "Alice", "New"),
//!     Message::new(Utc.with_ymd_and_hms(2024, 6, 16, 12, 0, 0).unwrap(), "Bob", "Hi"),
//! ];
//!
//! let config = FilterConfig::new()
//!     .with_date_from("2024-06-01")?
//!     .with_user("alice");
//!
//! let filtered = apply_filters(messages, &config);
//! assert_eq!(filtered.len(), 1);
//! assert_eq!(filtered[0].message, "New");
//! # Ok(())
//! # }
//! ```
//!
//! # Behavior Notes
//!
//! - User matching is case-insensitive for ASCII characters
//! - Multiple filters are combined with AND logic

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::RegexBuilder;

use crate::Message;
use crate::error::{ChatscrollError, Result};

/// Configuration for filtering messages by date and user.
///
/// Filters are combined with AND logic: a message must match all active
/// filters to be included in the result.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Include only messages on or after this timestamp.
    pub after: Option<DateTime<Utc>>,

    /// Include only messages on or before this timestamp.
    pub before: Option<DateTime<Utc>>,

    /// Include only messages from this user (case-insensitive).
    pub user: Option<String>,
}

impl FilterConfig {
    /// Creates a new empty filter configuration.
    ///
    /// No filters are active by default; all messages pass through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the start date filter (inclusive).
    ///
    /// Date format: `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::InvalidDate`] if the format is invalid.
    pub fn with_date_from(mut self, date_str: &str) -> Result<Self> {
        let date = parse_date(date_str)?;
        self.after = Some(date.and_time(NaiveTime::MIN).and_utc());
        Ok(self)
    }

    /// Sets the end date filter (inclusive, up to the last second of the day).
    ///
    /// Date format: `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::InvalidDate`] if the format is invalid.
    pub fn with_date_to(mut self, date_str: &str) -> Result<Self> {
        let date = parse_date(date_str)?;
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)
            .ok_or_else(|| ChatscrollError::invalid_date(date_str))?;
        self.before = Some(date.and_time(end_of_day).and_utc());
        Ok(self)
    }

    /// Alias for [`with_date_from`](Self::with_date_from).
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::InvalidDate`] if the format is invalid.
    pub fn after_date(self, date_str: &str) -> Result<Self> {
        self.with_date_from(date_str)
    }

    /// Alias for [`with_date_to`](Self::with_date_to).
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::InvalidDate`] if the format is invalid.
    pub fn before_date(self, date_str: &str) -> Result<Self> {
        self.with_date_to(date_str)
    }

    /// Sets the user filter.
    ///
    /// Matching is case-insensitive for ASCII characters.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Sets the start timestamp directly.
    #[must_use]
    pub fn with_after(mut self, dt: DateTime<Utc>) -> Self {
        self.after = Some(dt);
        self
    }

    /// Sets the end timestamp directly.
    #[must_use]
    pub fn with_before(mut self, dt: DateTime<Utc>) -> Self {
        self.before = Some(dt);
        self
    }

    /// Returns `true` if any filter is active.
    pub fn is_active(&self) -> bool {
        self.after.is_some() || self.before.is_some() || self.user.is_some()
    }

    /// Returns `true` if `msg` passes every active filter.
    pub fn matches(&self, msg: &Message) -> bool {
        if let Some(ref user) = self.user {
            if !msg.user.eq_ignore_ascii_case(user) {
                return false;
            }
        }
        if self.after.is_some_and(|after| msg.time < after) {
            return false;
        }
        if self.before.is_some_and(|before| msg.time > before) {
            return false;
        }
        true
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| ChatscrollError::invalid_date(date_str))
}

/// Filters a collection of messages based on the provided configuration.
///
/// Returns the original messages unchanged if no filters are active.
pub fn apply_filters(messages: Vec<Message>, config: &FilterConfig) -> Vec<Message> {
    if !config.is_active() {
        return messages;
    }

    messages
        .into_iter()
        .filter(|msg| config.matches(msg))
        .collect()
}

/// Case-insensitive regex search over message text.
///
/// Results are ordered newest first.
///
/// # Errors
///
/// Returns [`ChatscrollError::InvalidPattern`] if `pattern` is not a valid
/// regular expression.
///
/// # Examples
///
/// ```
/// use chatscroll::core::filter::search_messages;
/// use chatscroll::Message;
/// use chrono::{TimeZone, Utc};
///
/// # fn main() -> chatscroll::Result<()> {
/// let messages = vec![
///     Message::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(), "Alice", "Pizza tonight?"),
///     Message::new(Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap(), "Bob", "pizza again!"),
///     Message::new(Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap(), "Alice", "sushi"),
/// ];
///
/// let hits = search_messages(&messages, "pizza")?;
/// assert_eq!(hits.len(), 2);
/// assert_eq!(hits[0].user, "Bob");
/// # Ok(())
/// # }
/// ```
pub fn search_messages<'a>(messages: &'a [Message], pattern: &str) -> Result<Vec<&'a Message>> {
    let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;

    let mut hits: Vec<&Message> = messages
        .iter()
        .filter(|msg| regex.is_match(&msg.message))
        .collect();
    hits.sort_by(|a, b| b.time.cmp(&a.time));

    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_msg(user: &str, message: &str, date: &str) -> Message {
        let naive = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Message::new(
            naive.and_hms_opt(12, 0, 0).unwrap().and_utc(),
            user,
            message,
        )
    }

    #[test]
    fn test_filter_by_user() {
        let messages = vec![
            make_msg("Alice", "Hello", "2024-01-01"),
            make_msg("Bob", "Hi", "2024-01-01"),
            make_msg("alice", "Bye", "2024-01-01"),
        ];

        let config = FilterConfig::new().with_user("Alice");
        let filtered = apply_filters(messages, &config);

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|m| m.user.eq_ignore_ascii_case("Alice")));
    }

    #[test]
    fn test_filter_by_date_after() {
        let messages = vec![
            make_msg("Alice", "Old", "2024-01-01"),
            make_msg("Alice", "New", "2024-06-15"),
        ];

        let config = FilterConfig::new().with_date_from("2024-06-01").unwrap();
        let filtered = apply_filters(messages, &config);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].message, "New");
    }

    #[test]
    fn test_filter_by_date_before_is_inclusive() {
        let messages = vec![
            make_msg("Alice", "Old", "2024-01-01"),
            make_msg("Alice", "New", "2024-06-15"),
        ];

        let config = FilterConfig::new().with_date_to("2024-01-01").unwrap();
        let filtered = apply_filters(messages, &config);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].message, "Old");
    }

    #[test]
    fn test_date_aliases() {
        let config = FilterConfig::new()
            .after_date("2024-01-01")
            .unwrap()
            .before_date("2024-01-31")
            .unwrap();
        assert!(config.matches(&make_msg("Alice", "in", "2024-01-31")));
        assert!(!config.matches(&make_msg("Alice", "out", "2024-02-01")));
    }

    #[test]
    fn test_invalid_date_format() {
        let result = FilterConfig::new().with_date_from("01-01-2024");
        assert!(matches!(result, Err(ChatscrollError::InvalidDate { .. })));
    }

    #[test]
    fn test_inactive_filter_passes_everything() {
        let messages = vec![make_msg("Alice", "a", "2024-01-01")];
        let config = FilterConfig::new();
        assert!(!config.is_active());
        assert_eq!(apply_filters(messages, &config).len(), 1);
    }

    #[test]
    fn test_search_is_case_insensitive_and_newest_first() {
        let messages = vec![
            make_msg("Alice", "Let's get PIZZA", "2024-01-01"),
            make_msg("Bob", "no", "2024-01-02"),
            make_msg("Sam", "pizza!!", "2024-01-03"),
        ];

        let hits = search_messages(&messages, "pizza").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].user, "Sam");
        assert_eq!(hits[1].user, "Alice");
    }

    #[test]
    fn test_search_supports_regex() {
        let messages = vec![
            make_msg("Alice", "call me at 555-1234", "2024-01-01"),
            make_msg("Bob", "no numbers here", "2024-01-02"),
        ];
        let hits = search_messages(&messages, r"\d{3}-\d{4}").unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_search_invalid_pattern() {
        let err = search_messages(&[], "(unclosed").unwrap_err();
        assert!(matches!(err, ChatscrollError::InvalidPattern(_)));
    }
}
