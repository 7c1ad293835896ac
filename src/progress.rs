//! Progress reporting for index construction.
//!
//! Embedding a chat is the only slow step in the pipeline. The embedding
//! retriever reports once per batch through a [`ProgressCallback`].
//!
//! # Example
//!
//! ```rust
//! use chatscroll::progress::{Progress, ProgressCallback};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|progress| {
//!     println!("Embedded {:.1}%", progress.percentage());
//! });
//!
//! let total = 100;
//! for done in (32..=total).step_by(32).chain([total]) {
//!     callback(Progress::new(done, total));
//! }
//! ```

use std::sync::Arc;

/// How far index construction has got.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Chunks embedded so far.
    pub chunks_done: usize,

    /// Chunks to embed in total.
    pub total_chunks: usize,
}

impl Progress {
    /// Creates a new progress instance.
    pub fn new(chunks_done: usize, total_chunks: usize) -> Self {
        Self {
            chunks_done,
            total_chunks,
        }
    }

    /// Returns the progress as a percentage (0.0 - 100.0).
    ///
    /// ```rust
    /// use chatscroll::progress::Progress;
    ///
    /// assert_eq!(Progress::new(16, 32).percentage(), 50.0);
    /// assert_eq!(Progress::new(0, 0).percentage(), 100.0);
    /// ```
    pub fn percentage(&self) -> f64 {
        if self.total_chunks == 0 {
            100.0
        } else {
            (self.chunks_done as f64 / self.total_chunks as f64) * 100.0
        }
    }

    /// Returns whether every chunk has been embedded.
    pub fn is_complete(&self) -> bool {
        self.chunks_done >= self.total_chunks
    }

    /// Returns the number of chunks still to embed.
    pub fn remaining(&self) -> usize {
        self.total_chunks.saturating_sub(self.chunks_done)
    }
}

/// Callback type for receiving progress updates.
///
/// This is a thread-safe callback that receives [`Progress`] updates
/// during index construction.
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Creates a no-op progress callback.
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Creates a progress callback that prints to stderr.
///
/// Used by the CLI while building an embedding index.
pub fn stderr_progress() -> ProgressCallback {
    Arc::new(|progress| {
        eprint!(
            "\rEmbedding chunks: {}/{} ({:.1}%)",
            progress.chunks_done,
            progress.total_chunks,
            progress.percentage()
        );
        if progress.is_complete() {
            eprintln!();
        }
    })
}
