//! Error types for fabula.

use thiserror::Error;

/// Result type for fabula operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for fabula operations.
///
/// Two variants are recoverable data conditions ([`Error::is_recoverable`]):
/// the pipeline counts them in [`crate::Diagnostics`] and degrades instead
/// of aborting. Under strict tags an ambiguity drops its whole sentence,
/// still without aborting. Every other variant aborts processing of the
/// current document.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Parse error (configuration, tagger payloads).
    #[error("Parse error: {0}")]
    Parse(String),

    /// No tie-break rule could pick a single tag for a token.
    #[error("Tag ambiguity at token {token:?}: candidates {candidates:?}")]
    TagAmbiguity {
        /// Surface text of the token
        token: String,
        /// The non-"O" tags found across frames
        candidates: Vec<String>,
    },

    /// Forward substring search found no occurrence of a token.
    #[error("Span projection miss: {surface:?} not found at or after char {cursor}")]
    SpanProjectionMiss {
        /// Surface text that was searched for
        surface: String,
        /// Cursor position (chars) the search started from
        cursor: usize,
    },

    /// Requested language is not supported.
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Requested extraction tool is not registered or cannot handle the request.
    #[error("Unsupported tool: {0}")]
    UnsupportedTool(String),

    /// External tagger failed.
    #[error("Tagger error: {0}")]
    Tagger(String),

    /// Error from the core data model (spans, registry, match modes).
    #[error(transparent)]
    Core(#[from] fabula_core::Error),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create an unsupported language error.
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Error::UnsupportedLanguage(lang.into())
    }

    /// Create an unsupported tool error.
    pub fn unsupported_tool(tool: impl Into<String>) -> Self {
        Error::UnsupportedTool(tool.into())
    }

    /// Create a tagger error.
    pub fn tagger(msg: impl Into<String>) -> Self {
        Error::Tagger(msg.into())
    }

    /// True for data conditions the pipeline can degrade around.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::TagAmbiguity { .. } | Error::SpanProjectionMiss { .. }
        )
    }
}
