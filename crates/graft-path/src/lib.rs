//! Path codec for graft.
//!
//! A path addresses one leaf inside a flattened object graph:
//! dot-separated member names with bracket indices for sequence elements,
//! e.g. `engine.cylinders[2].bore`.
//!
//! Paths are machine-generated by the flattener, never user input, so the
//! parser validates defensively but makes no attempt at error recovery.
//!
//! # Key Types
//!
//! - [`PathSegment`] — one member-name and/or index step
//! - [`parse_path`] / [`format_path`] — the codec pair
//! - [`same_branch`] — structural ancestor test used by the diff engine

pub mod codec;
pub mod error;

pub use codec::{format_path, parse_path, same_branch, PathSegment};
pub use error::{PathError, PathResult};
