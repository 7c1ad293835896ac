//! Chunk retrieval for question answering.
//!
//! A [`Retriever`] owns the chunks of one chat and returns the `k` most
//! relevant ones for a query. Two strategies are available:
//!
//! | Method | Type | Notes |
//! |--------|------|-------|
//! | [`RetrievalMethod::Bm25`] | [`LexicalRetriever`] | In-memory tantivy index, always available |
//! | [`RetrievalMethod::Embedding`] | `EmbeddingRetriever` | Vector index cached on disk, feature `embeddings` |
//!
//! # Example
//!
//! ```rust
//! use chatscroll::core::ChatSplitter;
//! use chatscroll::parsers::WhatsAppParser;
//! use chatscroll::retrieval::Retriever;
//!
//! # fn main() -> chatscroll::Result<()> {
//! let chat = WhatsAppParser::new().parse_str(
//!     "01.07.2025, 10:12 - Alex: Who is bringing the tent?\n\
//!      01.07.2025, 10:13 - Sam: I have the tent and two sleeping bags\n\
//!      01.07.2025, 10:14 - Jamie: I'll drive",
//! );
//!
//! let splitter = ChatSplitter::new(1, 0, 300)?;
//! let mut retriever = Retriever::lexical(&chat.messages, &splitter)?;
//!
//! let hits = retriever.retrieve("sleeping bags", 1)?;
//! assert!(hits[0].contains("Sam"));
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "embeddings")]
pub mod embedding;
pub mod lexical;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Message;
use crate::config::AppConfig;
use crate::core::splitter::{ChatSplitter, Chunk};
use crate::error::{ChatscrollError, Result};
use crate::progress::ProgressCallback;

#[cfg(feature = "embeddings")]
pub use embedding::{Embedder, EmbeddingOptions, EmbeddingRetriever, FastEmbedder};
pub use lexical::LexicalRetriever;

/// Separator between chunks in [`Retriever::retrieve_context`].
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Retrieval strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMethod {
    /// BM25 over chunk text.
    #[default]
    Bm25,
    /// Nearest neighbours in embedding space.
    #[serde(alias = "faiss", alias = "FAISS")]
    Embedding,
}

impl fmt::Display for RetrievalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalMethod::Bm25 => f.write_str("bm25"),
            RetrievalMethod::Embedding => f.write_str("embedding"),
        }
    }
}

/// A chunk index over one chat.
#[derive(Debug)]
pub enum Retriever {
    Lexical(LexicalRetriever),
    #[cfg(feature = "embeddings")]
    Embedding(EmbeddingRetriever),
}

impl Retriever {
    /// Splits `messages` and builds a BM25 index over the chunks.
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::IndexBuild`] if the in-memory index cannot
    /// be created.
    pub fn lexical(messages: &[Message], splitter: &ChatSplitter) -> Result<Self> {
        LexicalRetriever::new(splitter.split_messages(messages)).map(Retriever::Lexical)
    }

    /// Splits `messages` and builds (or loads from cache) an embedding index.
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::IndexBuild`] on any model, embedding,
    /// index or cache failure.
    #[cfg(feature = "embeddings")]
    pub fn embedding(
        messages: &[Message],
        splitter: &ChatSplitter,
        embedder: Box<dyn Embedder>,
        options: &EmbeddingOptions,
    ) -> Result<Self> {
        EmbeddingRetriever::build(splitter.split_messages(messages), embedder, options)
            .map(Retriever::Embedding)
    }

    /// Builds the retriever `config` asks for.
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::Config`] if the splitter section is invalid
    /// and [`ChatscrollError::IndexBuild`] if the index cannot be built.
    pub fn from_config(
        messages: &[Message],
        config: &AppConfig,
        progress: Option<ProgressCallback>,
    ) -> Result<Self> {
        let splitter = config.splitter.build()?;
        match config.retriever.retrieval_method {
            RetrievalMethod::Bm25 => Self::lexical(messages, &splitter),
            RetrievalMethod::Embedding => build_embedding(messages, &splitter, config, progress),
        }
    }

    /// Like [`from_config`](Self::from_config), but an embedding index that
    /// fails to build is replaced by a lexical one.
    pub fn build_with_fallback(
        messages: &[Message],
        config: &AppConfig,
        progress: Option<ProgressCallback>,
    ) -> Result<Self> {
        match Self::from_config(messages, config, progress) {
            Err(err)
                if err.is_index_build()
                    && config.retriever.retrieval_method == RetrievalMethod::Embedding =>
            {
                warn!(error = %err, "embedding index unavailable, falling back to BM25");
                Self::lexical(messages, &config.splitter.build()?)
            }
            other => other,
        }
    }

    /// Returns at most `k` chunk texts, best first.
    ///
    /// Fewer than `k` are returned only when the chat has fewer than `k`
    /// chunks.
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::Config`] if `k` is zero, and
    /// [`ChatscrollError::IndexBuild`] if the query cannot be embedded.
    pub fn retrieve(&mut self, query: &str, k: usize) -> Result<Vec<String>> {
        if k == 0 {
            return Err(ChatscrollError::config("k must be at least 1"));
        }
        let ranked = match self {
            Retriever::Lexical(retriever) => retriever.search(query, k)?,
            #[cfg(feature = "embeddings")]
            Retriever::Embedding(retriever) => retriever.search(query, k)?,
        };
        let chunks = self.chunks();
        Ok(pad_ranking(ranked, chunks.len(), k)
            .into_iter()
            .map(|i| chunks[i].text.clone())
            .collect())
    }

    /// Retrieved chunks joined by a blank line, ready for a prompt.
    pub fn retrieve_context(&mut self, query: &str, k: usize) -> Result<String> {
        Ok(self.retrieve(query, k)?.join(CONTEXT_SEPARATOR))
    }

    /// All chunks in corpus order.
    pub fn chunks(&self) -> &[Chunk] {
        match self {
            Retriever::Lexical(retriever) => retriever.chunks(),
            #[cfg(feature = "embeddings")]
            Retriever::Embedding(retriever) => retriever.chunks(),
        }
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks().len()
    }

    /// Returns `true` if the chat produced no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks().is_empty()
    }

    /// The strategy behind this retriever.
    pub fn method(&self) -> RetrievalMethod {
        match self {
            Retriever::Lexical(_) => RetrievalMethod::Bm25,
            #[cfg(feature = "embeddings")]
            Retriever::Embedding(_) => RetrievalMethod::Embedding,
        }
    }
}

#[cfg(feature = "embeddings")]
fn build_embedding(
    messages: &[Message],
    splitter: &ChatSplitter,
    config: &AppConfig,
    progress: Option<ProgressCallback>,
) -> Result<Retriever> {
    let embedder = FastEmbedder::new(&config.retriever.embeddings_model)?;
    let mut options = EmbeddingOptions::new(&config.retriever.index_dir)
        .with_batch_size(config.retriever.batch_size);
    if let Some(progress) = progress {
        options = options.with_progress(progress);
    }
    Retriever::embedding(messages, splitter, Box::new(embedder), &options)
}

#[cfg(not(feature = "embeddings"))]
fn build_embedding(
    _messages: &[Message],
    _splitter: &ChatSplitter,
    _config: &AppConfig,
    _progress: Option<ProgressCallback>,
) -> Result<Retriever> {
    Err(ChatscrollError::index_build(
        "chatscroll was built without the `embeddings` feature",
    ))
}

/// Completes a ranking of chunk positions to `min(k, total)` entries with
/// the unranked chunks in corpus order.
fn pad_ranking(mut ranked: Vec<usize>, total: usize, k: usize) -> Vec<usize> {
    let want = k.min(total);
    ranked.truncate(want);
    if ranked.len() < want {
        let mut seen = vec![false; total];
        for &i in &ranked {
            seen[i] = true;
        }
        let missing = want - ranked.len();
        ranked.extend((0..total).filter(|&i| !seen[i]).take(missing));
    }
    ranked
}
