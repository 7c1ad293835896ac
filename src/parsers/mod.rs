//! Chat export parsers.
//!
//! - [`WhatsAppParser`] - Parses WhatsApp TXT exports into a [`ParsedChat`]
//!
//! # Example
//!
//! ```rust
//! use chatscroll::parsers::WhatsAppParser;
//!
//! let export = "\
//! 01.07.2025, 10:12 - Alex: Morning!
//! 01.07.2025, 10:13 - Jamie joined using this group's invite link
//! 01.07.2025, 10:14 - Jamie: Hey Alex";
//!
//! let chat = WhatsAppParser::new().parse_str(export);
//! assert_eq!(chat.len(), 2);
//! assert_eq!(chat.users, vec!["Alex", "Jamie"]);
//! ```

mod whatsapp;

pub use whatsapp::WhatsAppParser;

use serde::Serialize;

use crate::Message;

/// The result of parsing one chat export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedChat {
    /// Messages in export order (chronological by construction).
    pub messages: Vec<Message>,

    /// Distinct senders, sorted ascending (case-sensitive).
    pub users: Vec<String>,

    /// What was dropped while parsing, and why.
    pub report: ParseReport,
}

impl ParsedChat {
    /// Number of parsed messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` when nothing in the input could be parsed.
    ///
    /// Callers decide whether an empty chat is an error.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Consumes the chat, returning the message list.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

/// Counters for records the parser skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    /// Timestamp-prefixed records found in the input.
    pub records: usize,

    /// Records whose timestamp did not match any known format.
    pub bad_timestamps: usize,

    /// Records without a `sender:` part (joins, leaves, other status lines).
    pub system_messages: usize,

    /// Records whose text was empty once media placeholders were removed.
    pub empty_messages: usize,
}

impl ParseReport {
    /// Total number of skipped records.
    pub fn skipped(&self) -> usize {
        self.bad_timestamps + self.system_messages + self.empty_messages
    }
}
