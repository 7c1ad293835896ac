//! Answer generation over retrieved chat context.
//!
//! - [`Generator`] - Streams answer fragments for a [`ChatRequest`]
//! - [`OllamaGenerator`] - Generator backed by a local Ollama server (feature `ollama`)
//! - [`prompts`] - System prompts and request assembly
//! - [`Conversation`] - Caller-owned question/answer history
//!
//! # Example
//!
//! ```rust
//! use chatscroll::llm::{ChatRequest, FragmentStream, Generator};
//!
//! /// Answers every question with the same two fragments.
//! struct Canned;
//!
//! impl Generator for Canned {
//!     fn generate(&self, _request: &ChatRequest) -> chatscroll::Result<FragmentStream> {
//!         Ok(Box::new(["Nobody ", "knows."].into_iter().map(|s| Ok(s.to_string()))))
//!     }
//! }
//!
//! let request = ChatRequest::new("any-model", Vec::new());
//! let answer: String = Canned
//!     .generate(&request)
//!     .unwrap()
//!     .collect::<chatscroll::Result<_>>()
//!     .unwrap();
//! assert_eq!(answer, "Nobody knows.");
//! ```

pub mod conversation;
#[cfg(feature = "ollama")]
pub mod ollama;
pub mod prompts;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use conversation::{Answer, Conversation, Outcome, Turn};
#[cfg(feature = "ollama")]
pub use ollama::OllamaGenerator;
pub use prompts::{SYSTEM_RAG, SYSTEM_RAG_REFINED, build_request};

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a chat completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Creates a message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A complete generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl ChatRequest {
    /// Creates a request with the default temperature.
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Answer text as it is produced. Dropping the stream cancels generation.
pub type FragmentStream = Box<dyn Iterator<Item = Result<String>>>;

/// Produces an answer for a request, fragment by fragment.
pub trait Generator {
    /// Starts generating.
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::Generation`](crate::ChatscrollError::Generation)
    /// if the backend cannot be reached or rejects the request. Failures
    /// after the first fragment are yielded by the stream instead.
    fn generate(&self, request: &ChatRequest) -> Result<FragmentStream>;
}
