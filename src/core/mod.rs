//! Core processing over parsed messages.
//!
//! This module contains:
//! - [`splitter`] - Overlapping windows of messages for retrieval
//! - [`filter`] - Message filtering by date and user, regex search
//! - [`stats`] - Activity and frequency statistics
//!
//! # Quick Start
//!
//! ```rust
//! use chatscroll::core::{ChatSplitter, ChatStats, FilterConfig, apply_filters};
//! ```

pub mod filter;
pub mod splitter;
pub mod stats;

// Re-export main types for convenience
pub use filter::{FilterConfig, apply_filters, search_messages};
pub use splitter::{ChatSplitter, Chunk};
pub use stats::{ChatStats, Overview, Stopwords, UserOverview, UserStats};

// Re-export Message from the crate root
pub use crate::Message;
