//! Error types for the flatten crate.

/// Errors that can occur while flattening a graph.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FlattenError {
    /// The root was not a composite (object or sequence).
    #[error("flatten requires a composite root, got {kind}")]
    NonCompositeRoot {
        /// The runtime type of the rejected root.
        kind: String,
    },
}

/// Convenience alias for flatten results.
pub type FlattenResult<T> = Result<T, FlattenError>;
