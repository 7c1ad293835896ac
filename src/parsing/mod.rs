//! Low-level parsing utilities shared by the chat parser.
//!
//! - [`timestamp`] - Locale timestamp formats found in WhatsApp exports

pub mod timestamp;

// Re-export commonly used items
pub use timestamp::{TimestampFormat, match_timestamp, parse_timestamp};
