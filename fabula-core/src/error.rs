//! Error types for fabula-core.

use thiserror::Error;

/// Result type for fabula-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for fabula-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A span whose start lies after its end.
    #[error("Invalid span: start {start} > end {end}")]
    InvalidSpan {
        /// Start offset (inclusive)
        start: usize,
        /// End offset (exclusive)
        end: usize,
    },

    /// Lookup mode that is neither `exact` nor `partial`.
    #[error("Invalid match mode: {0:?} (expected one of: exact, partial)")]
    InvalidMatchMode(String),

    /// Id that does not resolve to a registered entity.
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),
}

impl Error {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid match mode error.
    #[must_use]
    pub fn invalid_match_mode(mode: impl Into<String>) -> Self {
        Self::InvalidMatchMode(mode.into())
    }

    /// Create an unknown entity error.
    #[must_use]
    pub fn unknown_entity(id: impl Into<String>) -> Self {
        Self::UnknownEntity(id.into())
    }
}
