//! Foundation types for graft.
//!
//! This crate provides the dynamic object-graph representation that every
//! other graft crate operates on. Rust has no runtime reflection, so hosts
//! describe their object graphs with [`Value`] / [`NodeRef`] and register
//! default constructors in a [`TypeRegistry`]; the engine never touches a
//! concrete host type.
//!
//! # Key Types
//!
//! - [`Value`] — a leaf scalar, string, null, or a composite node handle
//! - [`NodeRef`] — shared, mutable, identity-bearing composite handle
//! - [`NodeId`] — reference identity, independent of value equality
//! - [`LeafValue`] / [`FieldRecord`] — the flattened-graph record shape
//! - [`TypeRegistry`] — factory table for constructing default instances

pub mod graph;
pub mod node;
pub mod record;
pub mod registry;
pub mod value;

pub use graph::{deep_clone, structurally_eq};
pub use node::{FieldSlot, Node, NodeId, NodeRef, ObjectNode, SeqKind, SeqNode};
pub use record::FieldRecord;
pub use registry::TypeRegistry;
pub use value::{LeafValue, Value};
