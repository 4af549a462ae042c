//! Graph flattener for graft.
//!
//! [`flatten`] walks an object graph depth-first and produces the ordered
//! [`FieldRecord`] sequence that the diff and patch engines operate on.
//! Member order is the objects' declaration order, so the output is stable
//! within one run.
//!
//! Cycles are broken with an ancestor identity stack: re-entering a node that
//! is currently being visited emits nothing and descends no further. The
//! cyclic branch is silently truncated — callers get no marker record.

pub mod error;

use std::collections::HashSet;

use tracing::debug;

use graft_types::{FieldRecord, Node, NodeId, Value};

pub use error::{FlattenError, FlattenResult};

/// Flatten an object graph into ordered (path, leaf value) records.
///
/// The root must be a composite; a bare scalar, string, or null root is
/// rejected. Pure with respect to the input graph.
pub fn flatten(root: &Value) -> FlattenResult<Vec<FieldRecord>> {
    let node = match root {
        Value::Node(node) => node,
        other => {
            return Err(FlattenError::NonCompositeRoot {
                kind: other.type_label(),
            });
        }
    };

    let mut records = Vec::new();
    let mut ancestors: HashSet<NodeId> = HashSet::new();
    walk(&Value::Node(node.clone()), String::new(), &mut ancestors, &mut records);
    Ok(records)
}

fn walk(value: &Value, path: String, ancestors: &mut HashSet<NodeId>, out: &mut Vec<FieldRecord>) {
    match value {
        Value::Node(node) => {
            let id = node.id();
            if !ancestors.insert(id) {
                // Already on the current descent path: truncate the cycle.
                debug!(path = %path, "truncating cyclic branch");
                return;
            }

            match &*node.borrow() {
                Node::Object(object) => {
                    for member in object.members() {
                        let child_path = if path.is_empty() {
                            member.name.clone()
                        } else {
                            format!("{path}.{}", member.name)
                        };
                        walk(&member.value, child_path, ancestors, out);
                    }
                }
                Node::Seq(seq) => {
                    for (i, element) in seq.elements.iter().enumerate() {
                        walk(element, format!("{path}[{i}]"), ancestors, out);
                    }
                }
            }

            ancestors.remove(&id);
        }
        leaf => {
            let leaf = leaf.as_leaf().expect("non-node values are leaves");
            out.push(FieldRecord::new(path, leaf));
        }
    }
}
