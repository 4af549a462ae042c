//! Error types for the patch crate.

use graft_path::PathError;

/// Errors that can occur while replaying a patch onto a graph.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// The target was not a composite graph.
    #[error("patch target must be a composite graph, got {kind}")]
    NonCompositeTarget {
        /// The runtime type of the rejected target.
        kind: String,
    },

    /// A record's path could not be parsed.
    #[error("malformed record path: {0}")]
    Path(#[from] PathError),

    /// A path segment did not resolve against the target's actual shape.
    #[error("structural mismatch at {path:?}: {reason}")]
    StructuralMismatch {
        /// The full record path being applied.
        path: String,
        /// What failed to resolve.
        reason: String,
    },

    /// A missing intermediate node could not be materialized because no
    /// factory is registered for its declared type.
    #[error("cannot construct {type_name:?} while applying {path:?}: no registered factory")]
    Construction {
        /// The full record path being applied.
        path: String,
        /// The declared type with no factory.
        type_name: String,
    },
}

/// Convenience alias for apply results.
pub type ApplyResult<T> = Result<T, ApplyError>;
