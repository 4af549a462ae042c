//! Diff engine for graft.
//!
//! Compares two flattened graphs and produces a minimal [`Patch`]: the set
//! of (path, leaf value) records that, replayed onto a copy of the left
//! graph, reproduces the right graph.
//!
//! # Key Types
//!
//! - [`Patch`] — ordered change records with counting conveniences
//! - [`diff`] — the comparison itself

pub mod patch;

pub use patch::Patch;

use std::collections::HashMap;

use graft_path::same_branch;
use graft_types::{FieldRecord, LeafValue};

/// Compute the patch transforming `left` into `right`.
///
/// - Paths present on both sides with unequal values (by value, not
///   identity) become assignment records carrying the right-hand value.
/// - Paths only on the right become assignment records.
/// - Paths only on the left become null deletion records — unless some
///   right-hand path is a same-branch relative (a structural ancestor or
///   descendant), in which case the branch was restructured rather than
///   individually deleted and the record is suppressed.
pub fn diff(left: &[FieldRecord], right: &[FieldRecord]) -> Patch {
    let left_paths: HashMap<&str, &LeafValue> =
        left.iter().map(|r| (r.path.as_str(), &r.value)).collect();
    let right_paths: HashMap<&str, &LeafValue> =
        right.iter().map(|r| (r.path.as_str(), &r.value)).collect();

    let mut records = Vec::new();

    for record in left {
        match right_paths.get(record.path.as_str()) {
            Some(right_value) => {
                if **right_value != record.value {
                    records.push(FieldRecord::new(record.path.clone(), (*right_value).clone()));
                }
            }
            None => {
                let restructured = right
                    .iter()
                    .any(|r| same_branch(&record.path, &r.path));
                if !restructured {
                    records.push(FieldRecord::deletion(record.path.clone()));
                }
            }
        }
    }

    for record in right {
        if !left_paths.contains_key(record.path.as_str()) {
            records.push(FieldRecord::new(record.path.clone(), record.value.clone()));
        }
    }

    Patch::from_records(records)
}
