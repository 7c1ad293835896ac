//! Unified error types for chatscroll.
//!
//! This module provides a single [`ChatscrollError`] enum that covers all error
//! cases in the library.
//!
//! # Error Handling Philosophy
//!
//! - **Per-record problems** while parsing a chat (an unparseable timestamp,
//!   a status line without a sender) never surface here: the parser skips
//!   the record and counts it in its report
//! - **Configuration** and **index build** failures abort immediately and are
//!   returned verbatim, so the caller decides what to tell the user
//! - **Developers** get source error chains for debugging

use std::io;

use thiserror::Error;

/// A specialized [`Result`] type for chatscroll operations.
///
/// # Example
///
/// ```rust
/// use chatscroll::error::Result;
/// use chatscroll::Message;
///
/// fn my_function() -> Result<Vec<Message>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatscrollError>;

/// The error type for all chatscroll operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatscrollError {
    /// An I/O error occurred.
    ///
    /// This typically happens when:
    /// - The chat export or config file doesn't exist
    /// - Permission denied
    /// - The index cache directory cannot be written
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A timestamp did not match any of the known export formats.
    #[error("Unrecognized timestamp format: {input}")]
    Format {
        /// The offending timestamp text
        input: String,
    },

    /// Invalid configuration (splitter bounds, retriever settings, config file).
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the violated constraint
        message: String,
    },

    /// Building or loading a retrieval index failed.
    ///
    /// Raised by the embedding-based retriever when the model cannot be
    /// loaded, embedding fails, or the index cache is unusable.
    #[error("Failed to build retrieval index: {message}")]
    IndexBuild {
        /// What went wrong
        message: String,
    },

    /// Invalid date in a filter.
    ///
    /// Date filters expect YYYY-MM-DD format.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The invalid date string that was provided
        input: String,
        /// Expected format description
        expected: &'static str,
    },

    /// A search pattern is not a valid regular expression.
    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The text generation backend failed.
    #[error("Generation failed: {message}")]
    Generation {
        /// Backend error description
        message: String,
    },
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatscrollError {
    /// Creates a timestamp format error.
    pub fn format(input: impl Into<String>) -> Self {
        ChatscrollError::Format {
            input: input.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ChatscrollError::Config {
            message: message.into(),
        }
    }

    /// Creates an index build error.
    pub fn index_build(message: impl Into<String>) -> Self {
        ChatscrollError::IndexBuild {
            message: message.into(),
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        ChatscrollError::InvalidDate {
            input: input.into(),
            expected: "YYYY-MM-DD",
        }
    }

    /// Creates a generation error.
    pub fn generation(message: impl Into<String>) -> Self {
        ChatscrollError::Generation {
            message: message.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatscrollError::Io(_))
    }

    /// Returns `true` if this is a timestamp format error.
    pub fn is_format(&self) -> bool {
        matches!(self, ChatscrollError::Format { .. })
    }

    /// Returns `true` if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, ChatscrollError::Config { .. })
    }

    /// Returns `true` if this is an index build error.
    ///
    /// Callers typically fall back to the lexical retriever on this one.
    pub fn is_index_build(&self) -> bool {
        matches!(self, ChatscrollError::IndexBuild { .. })
    }

    /// Returns `true` if this is a date-related error.
    pub fn is_invalid_date(&self) -> bool {
        matches!(self, ChatscrollError::InvalidDate { .. })
    }
}

impl From<tantivy::TantivyError> for ChatscrollError {
    fn from(err: tantivy::TantivyError) -> Self {
        ChatscrollError::index_build(err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = ChatscrollError::from(io_err);
        let display = err.to_string();
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
        assert!(err.is_io());
    }

    #[test]
    fn test_format_error_display() {
        let err = ChatscrollError::format("32.13.2024, 25:61");
        assert_eq!(
            err.to_string(),
            "Unrecognized timestamp format: 32.13.2024, 25:61"
        );
        assert!(err.is_format());
    }

    #[test]
    fn test_config_error_display() {
        let err = ChatscrollError::config("chunk_overlap (3) must be less than chunk_size (3)");
        assert!(err.to_string().contains("Invalid configuration"));
        assert!(err.to_string().contains("chunk_overlap (3)"));
        assert!(err.is_config());
        assert!(!err.is_index_build());
    }

    #[test]
    fn test_index_build_error_display() {
        let err = ChatscrollError::index_build("model not available");
        assert!(err.to_string().contains("retrieval index"));
        assert!(err.is_index_build());
    }

    #[test]
    fn test_invalid_date_display() {
        let err = ChatscrollError::invalid_date("01-01-2024");
        let display = err.to_string();
        assert!(display.contains("01-01-2024"));
        assert!(display.contains("YYYY-MM-DD"));
        assert!(err.is_invalid_date());
    }

    #[test]
    fn test_invalid_pattern_from_regex() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err = ChatscrollError::from(regex_err);
        assert!(err.to_string().starts_with("Invalid search pattern"));
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = ChatscrollError::from(io_err);
        assert!(err.source().is_some());

        let err = ChatscrollError::config("bad");
        assert!(err.source().is_none());
    }
}
