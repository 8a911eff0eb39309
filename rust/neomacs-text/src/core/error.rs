//! Error types for the text layout engine.

use thiserror::Error;

/// Main error type for layout operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A code point index outside `[0, len]` was passed to a query.
    #[error("code point index {index} out of range (length {len})")]
    ArgumentOutOfRange { index: usize, len: usize },

    /// A caller supplied array did not match the length of the input.
    #[error("{what}: expected length {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A code point range that is empty where it must not be, or reversed.
    #[error("invalid range {start}..{end}")]
    InvalidRange { start: usize, end: usize },

    /// An internal invariant was violated. This is a bug, not a data condition.
    #[error("internal layout error: {0}")]
    Internal(String),
}

/// Result type alias
pub type LayoutResult<T> = Result<T, LayoutError>;
