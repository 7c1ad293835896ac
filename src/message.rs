//! The parsed chat message type.
//!
//! This module provides [`Message`], one timestamped line of conversation
//! recovered from a chat export. The parser only produces messages that have
//! a parsed time, a non-empty sender and non-empty text with markup removed.
//!
//! # Examples
//!
//! ```
//! use chatscroll::Message;
//! use chrono::{TimeZone, Utc};
//!
//! let time = Utc.with_ymd_and_hms(2025, 7, 1, 10, 12, 0).unwrap();
//! let msg = Message::new(time, "Alex", "Morning all!");
//!
//! assert_eq!(msg.user(), "Alex");
//! assert_eq!(msg.message(), "Morning all!");
//! assert_eq!(msg.time(), time);
//! ```
//!
//! ## Serialization
//!
//! ```
//! use chatscroll::Message;
//! use chrono::{TimeZone, Utc};
//!
//! let time = Utc.with_ymd_and_hms(2025, 7, 1, 10, 12, 0).unwrap();
//! let msg = Message::new(time, "Alex", "Hello!");
//! let json = serde_json::to_string(&msg)?;
//! let parsed: Message = serde_json::from_str(&json)?;
//!
//! assert_eq!(msg, parsed);
//! # Ok::<(), serde_json::Error>(())
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single chat message.
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `time` | `DateTime<Utc>` | When the message was sent (export wall-clock time) |
/// | `user` | `String` | Display name of the sender |
/// | `message` | `String` | Text content, may span several lines |
///
/// Exports carry no time zone, so the wall-clock time is stored as UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// When the message was sent.
    pub time: DateTime<Utc>,

    /// Display name of the message author.
    pub user: String,

    /// Text content of the message.
    ///
    /// Multi-line bodies keep their inner newlines.
    pub message: String,
}

impl Message {
    /// Creates a new message.
    pub fn new(time: DateTime<Utc>, user: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            time,
            user: user.into(),
            message: message.into(),
        }
    }

    /// Returns the time the message was sent.
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Returns the sender name.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Number of whitespace-separated words in the text.
    pub fn word_count(&self) -> usize {
        self.message.split_whitespace().count()
    }

    /// Number of characters (Unicode scalar values) in the text.
    pub fn char_count(&self) -> usize {
        self.message.chars().count()
    }
}
