//! Three-way merge engine for graft.
//!
//! [`three_way_merge`] reconciles a base graph with two divergent revisions
//! ("yours" and "theirs") by direct recursive descent — it does not go
//! through the flatten/diff machinery. Scalars are compared inline;
//! sequence-like composites are treated as single atomic leaves through an
//! injected [`AtomicCodec`], because per-element merging of ordered
//! collections is ambiguous under reordering and insertion.
//!
//! # Key Types
//!
//! - [`ConflictResolution`] — what to do where base/yours/theirs disagree
//! - [`Conflict`] — one irreconcilable path, with all three operand values
//! - [`AtomicCodec`] / [`JsonCodec`] — the composite-as-leaf encode/decode pair
//! - [`MergeOptions`] / [`MergeOutcome`] — call configuration and result

pub mod codec;
pub mod conflict;
pub mod error;
pub mod merge;

pub use codec::{AtomicCodec, CodecError, JsonCodec};
pub use conflict::{Conflict, ConflictResolution};
pub use error::{MergeError, MergeResult};
pub use merge::{three_way_merge, MergeOptions, MergeOutcome};
