//! High-level SDK for graft.
//!
//! graft reconciles live in-memory object graphs the way a version-control
//! system reconciles text: flatten a graph into addressed leaf records, diff
//! two flattened graphs into a minimal patch, replay a patch onto another
//! graph of the same shape, or three-way merge divergent revisions with
//! precise conflict semantics.
//!
//! # Example
//!
//! ```
//! use graft_sdk::{Reconciler, Value, NodeRef};
//!
//! let left = NodeRef::object("Config").with_member("port", "i64", Value::Int(80));
//! let right = NodeRef::object("Config").with_member("port", "i64", Value::Int(8080));
//!
//! let engine = Reconciler::new();
//! let patch = engine.diff(&Value::Node(left.clone()), &Value::Node(right)).unwrap();
//! engine.apply(&patch, &Value::Node(left.clone())).unwrap();
//! assert_eq!(left.get("port"), Some(Value::Int(8080)));
//! ```

pub mod error;
pub mod reconciler;

pub use error::{SdkError, SdkResult};
pub use reconciler::Reconciler;

// Re-export the engine vocabulary so most hosts need only this crate.
pub use graft_diff::Patch;
pub use graft_flatten::FlattenError;
pub use graft_merge::{
    AtomicCodec, CodecError, Conflict, ConflictResolution, JsonCodec, MergeError, MergeOptions,
    MergeOutcome,
};
pub use graft_patch::ApplyError;
pub use graft_path::{format_path, parse_path, PathError, PathSegment};
pub use graft_types::{
    deep_clone, structurally_eq, FieldRecord, LeafValue, Node, NodeId, NodeRef, ObjectNode,
    SeqKind, SeqNode, TypeRegistry, Value,
};
