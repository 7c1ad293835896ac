//! Overlapping message windows for retrieval indexing.
//!
//! [`ChatSplitter`] turns an ordered message list into [`Chunk`]s: windows of
//! `chunk_size` messages, consecutive windows sharing `chunk_overlap`
//! messages. The window that reaches the end of the list is the last one.
//! Each message is rendered on its own line as
//!
//! ```text
//! 2025-07-01 10:12 - Alex: <message, truncated to max_message_length chars>...
//! ```
//!
//! # Example
//!
//! ```
//! use chatscroll::Message;
//! use chatscroll::core::splitter::ChatSplitter;
//! use chrono::{TimeZone, Utc};
//!
//! # fn main() -> chatscroll::Result<()> {
//! let time = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
//! let messages = vec![Message::new(time, "Alice", "X".repeat(100))];
//!
//! let splitter = ChatSplitter::new(1, 0, 50)?;
//! let chunks = splitter.split_messages(&messages);
//!
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].text, format!("2020-01-01 00:00 - Alice: {}...", "X".repeat(50)));
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::Message;
use crate::error::{ChatscrollError, Result};

/// Appended to truncated messages.
pub const ELLIPSIS: &str = "...";

/// Time format used when rendering messages into chunks (minute precision).
pub const CHUNK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A rendered window of messages, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chunk {
    /// Newline-joined rendering of the window.
    pub text: String,
}

impl Chunk {
    /// Creates a chunk from already rendered text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the chunk text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Splits a message list into overlapping, size-bounded chunks.
///
/// The configuration is validated at construction: `chunk_size >= 1` and
/// `chunk_overlap < chunk_size`, so the window always advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    max_message_length: usize,
}

impl Default for ChatSplitter {
    fn default() -> Self {
        Self {
            chunk_size: 10,
            chunk_overlap: 5,
            max_message_length: 300,
        }
    }
}

impl ChatSplitter {
    /// Creates a splitter.
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::Config`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize, max_message_length: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(ChatscrollError::config("chunk_size must be at least 1"));
        }
        if chunk_overlap >= chunk_size {
            return Err(ChatscrollError::config(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            max_message_length,
        })
    }

    /// Messages per window.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Messages shared by consecutive windows.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Characters kept per message before truncation.
    pub fn max_message_length(&self) -> usize {
        self.max_message_length
    }

    /// Window advance between consecutive chunks.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }

    /// Renders every window of `messages` into a chunk, in window order.
    ///
    /// Windows start every [`stride`](Self::stride) messages, and the first
    /// window that reaches the last message is the final one. A trailing
    /// window lying entirely inside its predecessor is never emitted, so the
    /// count always matches [`chunk_count`](Self::chunk_count).
    ///
    /// Pure: the same input and configuration always give the same chunks.
    pub fn split_messages(&self, messages: &[Message]) -> Vec<Chunk> {
        let mut chunks = Vec::with_capacity(self.chunk_count(messages.len()));
        let mut i = 0;

        while i < messages.len() {
            let end = (i + self.chunk_size).min(messages.len());
            let text = messages[i..end]
                .iter()
                .map(|msg| self.render_message(msg))
                .collect::<Vec<_>>()
                .join("\n");
            chunks.push(Chunk { text });
            if end == messages.len() {
                break;
            }
            i += self.stride();
        }

        chunks
    }

    /// Number of chunks [`split_messages`](Self::split_messages) produces for
    /// `message_count` messages.
    ///
    /// Equals `ceil((m - overlap) / (chunk_size - overlap))` for `m > overlap`.
    pub fn chunk_count(&self, message_count: usize) -> usize {
        if message_count == 0 {
            return 0;
        }
        1 + message_count
            .saturating_sub(self.chunk_size)
            .div_ceil(self.stride())
    }

    /// Renders one message as a chunk line.
    pub fn render_message(&self, msg: &Message) -> String {
        format!(
            "{} - {}: {}",
            msg.time.format(CHUNK_TIME_FORMAT),
            msg.user,
            self.truncate_message(&msg.message)
        )
    }

    /// Keeps the first `max_message_length` characters of `message`,
    /// appending [`ELLIPSIS`] if anything was cut.
    pub fn truncate_message(&self, message: &str) -> String {
        match message.char_indices().nth(self.max_message_length) {
            Some((cut, _)) => format!("{}{ELLIPSIS}", &message[..cut]),
            None => message.to_string(),
        }
    }
}
