//! Error type for the SDK facade.

use graft_flatten::FlattenError;
use graft_merge::MergeError;
use graft_patch::ApplyError;
use graft_path::PathError;

/// Any error surfaced by the high-level API.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// Graph flattening failed.
    #[error(transparent)]
    Flatten(#[from] FlattenError),

    /// A path could not be parsed.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Patch replay failed.
    #[error(transparent)]
    Apply(#[from] ApplyError),

    /// The three-way merge failed.
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Convenience alias for SDK results.
pub type SdkResult<T> = Result<T, SdkError>;
