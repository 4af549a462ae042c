//! Patch applier for graft.
//!
//! [`apply`] replays a [`Patch`] onto a target graph in place. It is a pure
//! replay mechanism: it assumes conflicts were already resolved upstream and
//! performs no conflict detection of its own.
//!
//! While descending a record's path the applier repairs the target's shape
//! as needed: a null intermediate member is materialized through the
//! [`TypeRegistry`], and a sequence too short for an index is grown — in
//! place for growable sequences, by allocating a replacement and rebinding
//! the owner's reference for fixed-size ones.

pub mod error;

use tracing::debug;

use graft_diff::Patch;
use graft_path::{parse_path, PathSegment};
use graft_types::{LeafValue, NodeRef, SeqKind, SeqNode, TypeRegistry, Value};

pub use error::{ApplyError, ApplyResult};

/// Replay a patch onto a graph, mutating it in place.
///
/// Records are applied in patch order. The call stops at the first record
/// that fails; earlier records stay applied.
pub fn apply(patch: &Patch, target: &Value, registry: &TypeRegistry) -> ApplyResult<()> {
    let root = target
        .as_node()
        .ok_or_else(|| ApplyError::NonCompositeTarget {
            kind: target.type_label(),
        })?
        .clone();

    for record in patch {
        let segments = parse_path(&record.path)?;
        let steps = expand_steps(&segments);
        apply_record(&root, &steps, &record.path, &record.value, registry)?;
    }
    Ok(())
}

/// One primitive navigation step: a path segment split into its member and
/// index halves.
enum Step<'a> {
    Member(&'a str),
    Index(usize),
}

fn expand_steps<'a>(segments: &'a [PathSegment]) -> Vec<Step<'a>> {
    let mut steps = Vec::with_capacity(segments.len());
    for segment in segments {
        if let Some(name) = &segment.member {
            steps.push(Step::Member(name));
        }
        if let Some(index) = segment.index {
            steps.push(Step::Index(index));
        }
    }
    steps
}

/// Which slot of an owner currently holds the cursor node. Needed to rebind
/// the owner when a fixed-size sequence is reallocated.
enum OwnerSlot {
    Member(String),
    Index(usize),
}

struct Cursor {
    node: NodeRef,
    owner: Option<(NodeRef, OwnerSlot)>,
}

fn apply_record(
    root: &NodeRef,
    steps: &[Step<'_>],
    path: &str,
    value: &LeafValue,
    registry: &TypeRegistry,
) -> ApplyResult<()> {
    let mut cursor = Cursor {
        node: root.clone(),
        owner: None,
    };

    let (terminal, intermediate) = steps.split_last().ok_or_else(|| mismatch(path, "empty path"))?;

    for step in intermediate {
        descend(&mut cursor, step, path, registry)?;
    }
    assign(&mut cursor, terminal, path, value)
}

fn mismatch(path: &str, reason: impl Into<String>) -> ApplyError {
    ApplyError::StructuralMismatch {
        path: path.to_string(),
        reason: reason.into(),
    }
}

/// Move the cursor one step down, materializing missing nodes on the way.
fn descend(
    cursor: &mut Cursor,
    step: &Step<'_>,
    path: &str,
    registry: &TypeRegistry,
) -> ApplyResult<()> {
    let (child, slot) = match step {
        Step::Member(name) => {
            let child = {
                let mut node = cursor.node.borrow_mut();
                let object = node
                    .as_object_mut()
                    .ok_or_else(|| mismatch(path, format!("member {name:?} on a sequence")))?;
                let slot = object
                    .slot_mut(name)
                    .ok_or_else(|| mismatch(path, format!("no member named {name:?}")))?;
                if slot.value.is_null() {
                    let constructed = registry.construct(&slot.declared_type).ok_or_else(|| {
                        ApplyError::Construction {
                            path: path.to_string(),
                            type_name: slot.declared_type.clone(),
                        }
                    })?;
                    debug!(path = %path, member = %name, type_name = %slot.declared_type,
                        "constructed missing intermediate node");
                    slot.value = constructed;
                }
                slot.value.clone()
            };
            (child, OwnerSlot::Member((*name).to_string()))
        }
        Step::Index(index) => {
            ensure_index(cursor, *index, path)?;
            let child = {
                let mut node = cursor.node.borrow_mut();
                let seq = node
                    .as_seq_mut()
                    .expect("ensure_index verified a sequence node");
                if seq.elements[*index].is_null() {
                    let constructed = registry.construct(&seq.element_type).ok_or_else(|| {
                        ApplyError::Construction {
                            path: path.to_string(),
                            type_name: seq.element_type.clone(),
                        }
                    })?;
                    debug!(path = %path, index, type_name = %seq.element_type,
                        "constructed missing sequence element");
                    seq.elements[*index] = constructed;
                }
                seq.elements[*index].clone()
            };
            (child, OwnerSlot::Index(*index))
        }
    };

    match child {
        Value::Node(next) => {
            cursor.owner = Some((cursor.node.clone(), slot));
            cursor.node = next;
            Ok(())
        }
        other => Err(mismatch(
            path,
            format!("cannot descend into leaf of type {}", other.type_label()),
        )),
    }
}

/// Write the record's leaf value at the terminal step.
fn assign(cursor: &mut Cursor, step: &Step<'_>, path: &str, value: &LeafValue) -> ApplyResult<()> {
    match step {
        Step::Member(name) => {
            let mut node = cursor.node.borrow_mut();
            let object = node
                .as_object_mut()
                .ok_or_else(|| mismatch(path, format!("member {name:?} on a sequence")))?;
            if !object.assign(name, Value::from(value.clone())) {
                return Err(mismatch(path, format!("no member named {name:?}")));
            }
            Ok(())
        }
        Step::Index(index) => {
            ensure_index(cursor, *index, path)?;
            let mut node = cursor.node.borrow_mut();
            let seq = node
                .as_seq_mut()
                .expect("ensure_index verified a sequence node");
            seq.elements[*index] = Value::from(value.clone());
            Ok(())
        }
    }
}

/// Grow the cursor's sequence until `index` is in range.
///
/// Growable sequences are padded with nulls in place. Fixed-size sequences
/// get a fresh, longer node with the existing elements copied over; the
/// owner's slot is rebound to the replacement. A fixed-size sequence at the
/// graph root has no owner to rebind, so its contents are replaced through
/// the existing handle instead.
fn ensure_index(cursor: &mut Cursor, index: usize, path: &str) -> ApplyResult<()> {
    let (len, kind) = {
        let node = cursor.node.borrow();
        let seq = node
            .as_seq()
            .ok_or_else(|| mismatch(path, format!("index [{index}] into a non-sequence")))?;
        (seq.len(), seq.kind)
    };
    if index < len {
        return Ok(());
    }

    match kind {
        SeqKind::Growable => {
            let mut node = cursor.node.borrow_mut();
            let seq = node.as_seq_mut().expect("checked above");
            while seq.len() <= index {
                seq.elements.push(Value::Null);
            }
            debug!(path = %path, len = seq.len(), "grew sequence in place");
        }
        SeqKind::Fixed => {
            let replacement = {
                let node = cursor.node.borrow();
                let seq = node.as_seq().expect("checked above");
                let mut elements = seq.elements.clone();
                elements.resize(index + 1, Value::Null);
                SeqNode {
                    type_name: seq.type_name.clone(),
                    element_type: seq.element_type.clone(),
                    kind: SeqKind::Fixed,
                    elements,
                }
            };
            debug!(path = %path, len = replacement.elements.len(),
                "reallocated fixed-size sequence");

            match &cursor.owner {
                Some((owner, OwnerSlot::Member(name))) => {
                    let fresh = NodeRef::new(graft_types::Node::Seq(replacement));
                    owner
                        .borrow_mut()
                        .as_object_mut()
                        .expect("owner of a member slot is an object")
                        .assign(name, Value::Node(fresh.clone()));
                    cursor.node = fresh;
                }
                Some((owner, OwnerSlot::Index(slot))) => {
                    let fresh = NodeRef::new(graft_types::Node::Seq(replacement));
                    owner
                        .borrow_mut()
                        .as_seq_mut()
                        .expect("owner of an index slot is a sequence")
                        .elements[*slot] = Value::Node(fresh.clone());
                    cursor.node = fresh;
                }
                None => {
                    *cursor.node.borrow_mut() = graft_types::Node::Seq(replacement);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_diff::diff;
    use graft_flatten::flatten;
    use graft_types::{deep_clone, structurally_eq, FieldRecord, NodeRef};

    fn patch_of(records: Vec<FieldRecord>) -> Patch {
        Patch::from_records(records)
    }

    fn empty_registry() -> TypeRegistry {
        TypeRegistry::new()
    }

    #[test]
    fn assigns_existing_member() {
        let target = NodeRef::object("Car").with_member("doors", "i64", Value::Int(3));
        let patch = patch_of(vec![FieldRecord::new("doors", LeafValue::Int(5))]);

        apply(&patch, &Value::Node(target.clone()), &empty_registry()).unwrap();
        assert_eq!(target.get("doors"), Some(Value::Int(5)));
    }

    #[test]
    fn non_composite_target_is_rejected() {
        let patch = patch_of(vec![FieldRecord::new("x", LeafValue::Int(1))]);
        assert!(matches!(
            apply(&patch, &Value::Int(9), &empty_registry()),
            Err(ApplyError::NonCompositeTarget { .. })
        ));
    }

    #[test]
    fn unknown_member_is_structural_mismatch() {
        let target = NodeRef::object("Car").with_member("doors", "i64", Value::Int(3));
        let patch = patch_of(vec![FieldRecord::new("wheels", LeafValue::Int(4))]);

        let err = apply(&patch, &Value::Node(target), &empty_registry()).unwrap_err();
        assert!(matches!(err, ApplyError::StructuralMismatch { .. }));
    }

    #[test]
    fn index_into_non_sequence_is_structural_mismatch() {
        let target = NodeRef::object("Car").with_member("doors", "i64", Value::Int(3));
        let patch = patch_of(vec![FieldRecord::new("doors[0]", LeafValue::Int(1))]);

        let err = apply(&patch, &Value::Node(target), &empty_registry()).unwrap_err();
        assert!(matches!(err, ApplyError::StructuralMismatch { .. }));
    }

    #[test]
    fn descending_into_leaf_is_structural_mismatch() {
        let target = NodeRef::object("Car").with_member("doors", "i64", Value::Int(3));
        let patch = patch_of(vec![FieldRecord::new("doors.count", LeafValue::Int(1))]);

        let err = apply(&patch, &Value::Node(target), &empty_registry()).unwrap_err();
        assert!(matches!(err, ApplyError::StructuralMismatch { .. }));
    }

    #[test]
    fn constructs_null_intermediate_via_registry() {
        let target = NodeRef::object("Car").with_member("engine", "Engine", Value::Null);
        let mut registry = TypeRegistry::new();
        registry.register("Engine", || {
            Value::Node(NodeRef::object("Engine").with_member("power", "i64", Value::Null))
        });

        let patch = patch_of(vec![FieldRecord::new("engine.power", LeafValue::Int(300))]);
        apply(&patch, &Value::Node(target.clone()), &registry).unwrap();

        let engine = target.get("engine").unwrap();
        assert_eq!(engine.as_node().unwrap().get("power"), Some(Value::Int(300)));
    }

    #[test]
    fn unregistered_intermediate_type_is_construction_error() {
        let target = NodeRef::object("Car").with_member("engine", "Engine", Value::Null);
        let patch = patch_of(vec![FieldRecord::new("engine.power", LeafValue::Int(300))]);

        let err = apply(&patch, &Value::Node(target), &empty_registry()).unwrap_err();
        assert!(matches!(
            err,
            ApplyError::Construction { ref type_name, .. } if type_name == "Engine"
        ));
    }

    #[test]
    fn growable_sequence_grows_in_place() {
        let seq = NodeRef::seq("Vec<i64>", "i64", SeqKind::Growable, vec![Value::Int(1)]);
        let target =
            NodeRef::object("Bag").with_member("items", "Vec<i64>", Value::Node(seq.clone()));

        let patch = patch_of(vec![FieldRecord::new("items[3]", LeafValue::Int(9))]);
        apply(&patch, &Value::Node(target.clone()), &empty_registry()).unwrap();

        // Same node, longer; gap padded with nulls.
        let same = target.get("items").unwrap();
        assert_eq!(same.as_node().unwrap().id(), seq.id());
        let node = seq.borrow();
        let elements = &node.as_seq().unwrap().elements;
        assert_eq!(
            elements,
            &vec![Value::Int(1), Value::Null, Value::Null, Value::Int(9)]
        );
    }

    #[test]
    fn fixed_sequence_growth_rebinds_owner() {
        let seq = NodeRef::seq("[i64; 1]", "i64", SeqKind::Fixed, vec![Value::Int(1)]);
        let target =
            NodeRef::object("Bag").with_member("items", "[i64; 2]", Value::Node(seq.clone()));

        let patch = patch_of(vec![FieldRecord::new("items[1]", LeafValue::Int(2))]);
        apply(&patch, &Value::Node(target.clone()), &empty_registry()).unwrap();

        let rebound = target.get("items").unwrap();
        let rebound = rebound.as_node().unwrap();
        assert_ne!(rebound.id(), seq.id(), "owner now references a new node");
        assert_eq!(
            rebound.borrow().as_seq().unwrap().elements,
            vec![Value::Int(1), Value::Int(2)]
        );
        // The original node kept its length.
        assert_eq!(seq.borrow().as_seq().unwrap().len(), 1);
    }

    #[test]
    fn deletion_record_assigns_null() {
        let target = NodeRef::object("Car").with_member("name", "String", Value::Text("x".into()));
        let patch = patch_of(vec![FieldRecord::deletion("name")]);

        apply(&patch, &Value::Node(target.clone()), &empty_registry()).unwrap();
        assert_eq!(target.get("name"), Some(Value::Null));
    }

    fn sample_registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register("Engine", || {
            Value::Node(
                NodeRef::object("Engine")
                    .with_member("power", "i64", Value::Null)
                    .with_member("fuel", "String", Value::Null),
            )
        });
        registry
    }

    fn sample_car(name: &str, power: i64, tags: &[&str]) -> NodeRef {
        let tag_values = tags.iter().map(|t| Value::Text((*t).into())).collect();
        NodeRef::object("Car")
            .with_member("name", "String", Value::Text(name.into()))
            .with_member(
                "engine",
                "Engine",
                Value::Node(
                    NodeRef::object("Engine")
                        .with_member("power", "i64", Value::Int(power))
                        .with_member("fuel", "String", Value::Text("petrol".into())),
                ),
            )
            .with_member(
                "tags",
                "Vec<String>",
                Value::Node(NodeRef::seq("Vec<String>", "String", SeqKind::Growable, tag_values)),
            )
    }

    fn empty_car_shape() -> NodeRef {
        NodeRef::object("Car")
            .with_member("name", "String", Value::Null)
            .with_member("engine", "Engine", Value::Null)
            .with_member(
                "tags",
                "Vec<String>",
                Value::Node(NodeRef::seq("Vec<String>", "String", SeqKind::Growable, vec![])),
            )
    }

    #[test]
    fn flatten_then_apply_reconstructs_graph() {
        let original = Value::Node(sample_car("gt", 300, &["fast", "red"]));
        let records = flatten(&original).unwrap();

        let rebuilt = Value::Node(empty_car_shape());
        apply(&patch_of(records), &rebuilt, &sample_registry()).unwrap();

        assert!(structurally_eq(&original, &rebuilt));
    }

    #[test]
    fn diff_then_apply_transforms_left_into_right() {
        let a = Value::Node(sample_car("gt", 300, &["fast"]));
        let b = Value::Node(sample_car("gts", 350, &["fast", "track"]));

        let patch = diff(&flatten(&a).unwrap(), &flatten(&b).unwrap());
        let target = deep_clone(&a);
        apply(&patch, &target, &sample_registry()).unwrap();

        assert!(structurally_eq(&target, &b));
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let a = Value::Node(sample_car("gt", 300, &["fast", "red"]));
        let b = Value::Node(sample_car("gt2", 320, &["slow"]));

        let patch = diff(&flatten(&a).unwrap(), &flatten(&b).unwrap());
        let once = deep_clone(&a);
        apply(&patch, &once, &sample_registry()).unwrap();
        let twice = deep_clone(&a);
        apply(&patch, &twice, &sample_registry()).unwrap();
        apply(&patch, &twice, &sample_registry()).unwrap();

        assert!(structurally_eq(&once, &twice));
    }
}
