//! # Chatscroll
//!
//! A Rust library for exploring WhatsApp chat exports: parse them, look at
//! who talked when and about what, and ask questions answered from the
//! conversation itself.
//!
//! ## Overview
//!
//! Chatscroll turns an Android WhatsApp TXT export into a list of
//! [`Message`]s and builds on that list:
//! - **Statistics** - activity over time, per-user figures, word and emoji frequencies
//! - **Search** - date/user filters and case-insensitive regex search
//! - **Retrieval** - overlapping message chunks ranked by BM25 or by embedding
//!   similarity, with an on-disk index cache
//! - **Generation** - streamed answers from a local Ollama model over the
//!   retrieved chunks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatscroll::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let chat = WhatsAppParser::new().parse("whatsapp_chat.txt".as_ref())?;
//!
//!     // Statistics
//!     let stats = ChatStats::new(&chat.messages);
//!     if let Some(overview) = stats.overview() {
//!         println!("{} messages over {} days", overview.total_messages, overview.span_days);
//!     }
//!
//!     // Retrieval
//!     let mut retriever = Retriever::lexical(&chat.messages, &ChatSplitter::default())?;
//!     for chunk in retriever.retrieve("lake trip", 3)? {
//!         println!("{chunk}\n");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! Every tunable lives in [`AppConfig`](config::AppConfig), loaded from TOML:
//!
//! ```rust,no_run
//! use chatscroll::config::AppConfig;
//! use chatscroll::parsers::WhatsAppParser;
//! use chatscroll::retrieval::Retriever;
//!
//! # fn main() -> chatscroll::Result<()> {
//! let config = AppConfig::load("chatscroll.toml".as_ref())?;
//! let chat = WhatsAppParser::new().parse("whatsapp_chat.txt".as_ref())?;
//!
//! // Falls back to BM25 if the embedding index cannot be built
//! let mut retriever = Retriever::build_with_fallback(&chat.messages, &config, None)?;
//! let context = retriever.retrieve_context("who is driving?", config.retriever.k)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - [`parsing`] - Timestamp formats ([`parse_timestamp`](parsing::parse_timestamp))
//! - [`parsers`] - [`WhatsAppParser`](parsers::WhatsAppParser), [`ParsedChat`](parsers::ParsedChat)
//! - [`core`] - Processing over messages
//!   - [`core::splitter`] - [`ChatSplitter`](core::ChatSplitter), [`Chunk`](core::Chunk)
//!   - [`core::filter`] - [`FilterConfig`](core::FilterConfig), [`search_messages`](core::search_messages)
//!   - [`core::stats`] - [`ChatStats`](core::ChatStats), [`Stopwords`](core::Stopwords)
//! - [`retrieval`] - [`Retriever`](retrieval::Retriever) (BM25 and embedding)
//! - [`llm`] - [`Generator`](llm::Generator), prompts, [`Conversation`](llm::Conversation)
//! - [`config`] - [`AppConfig`](config::AppConfig) and its sections
//! - [`progress`] - Index build progress callbacks
//! - `cli` - CLI argument types (feature `cli`)
//! - [`error`] - Unified error types ([`ChatscrollError`], [`Result`])
//! - [`prelude`] - Convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod llm;
pub mod message;
pub mod parsers;
pub mod parsing;
pub mod progress;
pub mod retrieval;

// Re-export the main types at the crate root for convenience
pub use error::{ChatscrollError, Result};
pub use message::Message;

/// Convenient re-exports for common usage.
///
/// Import everything you need with a single line:
///
/// ```rust
/// use chatscroll::prelude::*;
/// ```
pub mod prelude {
    // Core message type
    pub use crate::Message;

    // Error types
    pub use crate::error::{ChatscrollError, Result};

    // Parsing
    pub use crate::parsers::{ParseReport, ParsedChat, WhatsAppParser};
    pub use crate::parsing::parse_timestamp;

    // Configuration
    pub use crate::config::{AppConfig, ModelConfig, RetrieverConfig, SplitterConfig};

    // Processing
    pub use crate::core::{
        ChatSplitter, ChatStats, Chunk, FilterConfig, Stopwords, apply_filters, search_messages,
    };

    // Retrieval
    pub use crate::retrieval::{RetrievalMethod, Retriever};

    // Generation
    pub use crate::llm::{Answer, ChatRequest, Conversation, Generator, Outcome};
}
