//! Error types for the merge crate.

use crate::codec::CodecError;
use crate::conflict::Conflict;

/// Errors that can occur during a three-way merge.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Non-null operands at one path have differing runtime types. This is
    /// unrecoverable and aborts the whole call.
    #[error("type mismatch at {path:?}: {left} vs {right}")]
    TypeMismatch {
        /// The path where the operands diverged in type.
        path: String,
        /// One operand's runtime type.
        left: String,
        /// The other operand's runtime type.
        right: String,
    },

    /// A member present on the base object is missing from one branch.
    #[error("member {member:?} at {path:?} is missing from one branch")]
    MissingMember {
        /// The parent object's path.
        path: String,
        /// The missing member name.
        member: String,
    },

    /// The injected atomic codec failed.
    #[error("atomic codec: {0}")]
    Codec(#[from] CodecError),

    /// The merge completed under the `Throw` policy with unresolved
    /// conflicts. Carries the full conflict list — this is the one error
    /// intended to give callers structured, actionable detail.
    #[error("merge produced {} conflict(s)", .0.len())]
    Conflicts(Vec<Conflict>),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
