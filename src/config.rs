//! Application configuration.
//!
//! Configuration is read from a TOML file. Every section and every field is
//! optional; missing values take the defaults below.
//!
//! ```toml
//! [model]
//! name = "llama3.2"
//! temperature = 0.5
//! # host = "http://127.0.0.1:11434"
//!
//! [splitter]
//! chunk_size = 10
//! chunk_overlap = 5
//! max_message_length = 300
//!
//! [retriever]
//! retrieval_method = "bm25"   # or "embedding"
//! k = 3
//! embeddings_model = "sentence-transformers/all-MiniLM-L6-v2"
//! index_dir = ".index_cache"
//! batch_size = 32
//! ```
//!
//! # Example
//!
//! ```rust
//! use chatscroll::config::{AppConfig, RetrieverConfig};
//! use chatscroll::retrieval::RetrievalMethod;
//!
//! let config = AppConfig::default().with_retriever(
//!     RetrieverConfig::new()
//!         .with_method(RetrievalMethod::Embedding)
//!         .with_k(5),
//! );
//! assert!(config.validate().is_ok());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::splitter::ChatSplitter;
use crate::error::{ChatscrollError, Result};
use crate::retrieval::RetrievalMethod;

/// Accepted range for [`RetrieverConfig::k`].
pub const K_RANGE: std::ops::RangeInclusive<usize> = 1..=50;

/// Accepted range for [`SplitterConfig::max_message_length`].
pub const MAX_MESSAGE_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 10..=5000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub splitter: SplitterConfig,
    pub retriever: RetrieverConfig,
}

impl AppConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::Io`] if the file cannot be read and
    /// [`ChatscrollError::Config`] if it is malformed or out of range.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses and validates TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .map_err(|e| ChatscrollError::config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section, reporting the first violation.
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        self.splitter.validate()?;
        self.retriever.validate()
    }

    /// Replaces the model section.
    #[must_use]
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    /// Replaces the splitter section.
    #[must_use]
    pub fn with_splitter(mut self, splitter: SplitterConfig) -> Self {
        self.splitter = splitter;
        self
    }

    /// Replaces the retriever section.
    #[must_use]
    pub fn with_retriever(mut self, retriever: RetrieverConfig) -> Self {
        self.retriever = retriever;
        self
    }
}

/// Generation model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Model name as known to the generation backend. No default: the CLI
    /// asks the backend for its installed models when unset.
    pub name: Option<String>,

    /// Sampling temperature (default: 0.5, must be > 0)
    pub temperature: f32,

    /// Backend URL. Falls back to `OLLAMA_HOST`, then the local default.
    pub host: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: None,
            temperature: 0.5,
            host: None,
        }
    }
}

impl ModelConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the backend URL.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if self.temperature.is_nan() || self.temperature <= 0.0 {
            return Err(ChatscrollError::config(format!(
                "model.temperature must be greater than 0, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// Chunking settings. See [`ChatSplitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitterConfig {
    /// Messages per chunk (default: 10)
    pub chunk_size: usize,

    /// Messages shared by consecutive chunks (default: 5)
    pub chunk_overlap: usize,

    /// Characters kept per message (default: 300)
    pub max_message_length: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 10,
            chunk_overlap: 5,
            max_message_length: 300,
        }
    }
}

impl SplitterConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Sets the chunk overlap.
    #[must_use]
    pub fn with_chunk_overlap(mut self, overlap: usize) -> Self {
        self.chunk_overlap = overlap;
        self
    }

    /// Sets the per-message character limit.
    #[must_use]
    pub fn with_max_message_length(mut self, length: usize) -> Self {
        self.max_message_length = length;
        self
    }

    /// Builds the splitter this section describes.
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::Config`] if the section is invalid.
    pub fn build(&self) -> Result<ChatSplitter> {
        self.validate()?;
        ChatSplitter::new(self.chunk_size, self.chunk_overlap, self.max_message_length)
    }

    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ChatscrollError::config("splitter.chunk_size must be at least 1"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ChatscrollError::config(format!(
                "splitter.chunk_overlap ({}) must be less than splitter.chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if !MAX_MESSAGE_LENGTH_RANGE.contains(&self.max_message_length) {
            return Err(ChatscrollError::config(format!(
                "splitter.max_message_length must be between {} and {}, got {}",
                MAX_MESSAGE_LENGTH_RANGE.start(),
                MAX_MESSAGE_LENGTH_RANGE.end(),
                self.max_message_length
            )));
        }
        Ok(())
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrieverConfig {
    /// Lexical or embedding retrieval (default: bm25)
    pub retrieval_method: RetrievalMethod,

    /// Chunks returned per query (default: 3)
    pub k: usize,

    /// Embedding model identifier.
    pub embeddings_model: String,

    /// Base directory for cached embedding indexes (default: `.index_cache`)
    pub index_dir: PathBuf,

    /// Chunks embedded per batch (default: 32)
    pub batch_size: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            retrieval_method: RetrievalMethod::Bm25,
            k: 3,
            embeddings_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            index_dir: PathBuf::from(".index_cache"),
            batch_size: 32,
        }
    }
}

impl RetrieverConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retrieval method.
    #[must_use]
    pub fn with_method(mut self, method: RetrievalMethod) -> Self {
        self.retrieval_method = method;
        self
    }

    /// Sets the number of chunks per query.
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Sets the embedding model identifier.
    #[must_use]
    pub fn with_embeddings_model(mut self, model: impl Into<String>) -> Self {
        self.embeddings_model = model.into();
        self
    }

    /// Sets the index cache directory.
    #[must_use]
    pub fn with_index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.index_dir = dir.into();
        self
    }

    /// Sets the embedding batch size.
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    fn validate(&self) -> Result<()> {
        if !K_RANGE.contains(&self.k) {
            return Err(ChatscrollError::config(format!(
                "retriever.k must be between {} and {}, got {}",
                K_RANGE.start(),
                K_RANGE.end(),
                self.k
            )));
        }
        if self.batch_size == 0 {
            return Err(ChatscrollError::config("retriever.batch_size must be at least 1"));
        }
        if self.embeddings_model.trim().is_empty() {
            return Err(ChatscrollError::config("retriever.embeddings_model must not be empty"));
        }
        Ok(())
    }
}
