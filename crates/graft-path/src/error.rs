//! Error types for the path crate.

/// Errors that can occur while parsing a path string.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathError {
    /// The path string was empty.
    #[error("path must not be empty")]
    Empty,

    /// A member segment had no name (e.g. `a..b` or a trailing dot).
    #[error("empty member name at byte {position} in {path:?}")]
    EmptyMember { path: String, position: usize },

    /// A `[` was never closed.
    #[error("unterminated index bracket in {path:?}")]
    UnterminatedBracket { path: String },

    /// The bracket content was not a non-negative integer.
    #[error("invalid index {index:?} in {path:?}")]
    InvalidIndex { path: String, index: String },

    /// A character appeared where a segment separator was expected.
    #[error("unexpected character {ch:?} at byte {position} in {path:?}")]
    UnexpectedChar {
        path: String,
        ch: char,
        position: usize,
    },
}

/// Convenience alias for path results.
pub type PathResult<T> = Result<T, PathError>;
