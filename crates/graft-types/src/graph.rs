//! Whole-graph helpers: identity-preserving deep clone and structural
//! equality.
//!
//! Both walk arbitrary graphs, so both carry identity-keyed bookkeeping to
//! terminate on cycles and to keep shared substructure shared.

use std::collections::{HashMap, HashSet};

use crate::node::{Node, NodeId, NodeRef, ObjectNode, SeqNode};
use crate::value::Value;

/// Deep-clone a value graph.
///
/// Every reachable node is copied exactly once: a node referenced from two
/// places in the source is referenced from two places in the clone, and
/// cycles are reproduced rather than unrolled.
pub fn deep_clone(value: &Value) -> Value {
    let mut seen: HashMap<NodeId, NodeRef> = HashMap::new();
    clone_value(value, &mut seen)
}

fn clone_value(value: &Value, seen: &mut HashMap<NodeId, NodeRef>) -> Value {
    match value {
        Value::Node(node) => Value::Node(clone_node(node, seen)),
        leaf => leaf.clone(),
    }
}

fn clone_node(node: &NodeRef, seen: &mut HashMap<NodeId, NodeRef>) -> NodeRef {
    if let Some(copy) = seen.get(&node.id()) {
        return copy.clone();
    }

    // Register the (still empty) copy before descending so that cyclic
    // references resolve to it.
    let copy = match &*node.borrow() {
        Node::Object(o) => NodeRef::new(Node::Object(ObjectNode::new(o.type_name.clone()))),
        Node::Seq(s) => NodeRef::new(Node::Seq(SeqNode {
            type_name: s.type_name.clone(),
            element_type: s.element_type.clone(),
            kind: s.kind,
            elements: Vec::new(),
        })),
    };
    seen.insert(node.id(), copy.clone());

    match &*node.borrow() {
        Node::Object(o) => {
            let members: Vec<_> = o
                .members()
                .map(|f| (f.name.clone(), f.declared_type.clone(), f.value.clone()))
                .collect();
            for (name, declared_type, value) in members {
                let cloned = clone_value(&value, seen);
                copy.borrow_mut()
                    .as_object_mut()
                    .expect("copy mirrors source kind")
                    .set_member(name, declared_type, cloned);
            }
        }
        Node::Seq(s) => {
            let elements: Vec<_> = s.elements.clone();
            for element in &elements {
                let cloned = clone_value(element, seen);
                copy.borrow_mut()
                    .as_seq_mut()
                    .expect("copy mirrors source kind")
                    .elements
                    .push(cloned);
            }
        }
    }

    copy
}

/// Structural equality of two value graphs.
///
/// Leaves compare by value. Objects compare by member-name lookup (order
/// insensitive) and sequences element-wise. Node identity is ignored except
/// for cycle handling: a node pair already under comparison is assumed equal,
/// which makes the comparison terminate and treats isomorphic cycles as
/// equal.
pub fn structurally_eq(a: &Value, b: &Value) -> bool {
    let mut in_progress: HashSet<(NodeId, NodeId)> = HashSet::new();
    eq_value(a, b, &mut in_progress)
}

fn eq_value(a: &Value, b: &Value, in_progress: &mut HashSet<(NodeId, NodeId)>) -> bool {
    match (a, b) {
        (Value::Node(na), Value::Node(nb)) => eq_node(na, nb, in_progress),
        (Value::Node(_), _) | (_, Value::Node(_)) => false,
        (la, lb) => la == lb,
    }
}

fn eq_node(a: &NodeRef, b: &NodeRef, in_progress: &mut HashSet<(NodeId, NodeId)>) -> bool {
    let pair = (a.id(), b.id());
    if pair.0 == pair.1 || !in_progress.insert(pair) {
        return true;
    }

    let result = match (&*a.borrow(), &*b.borrow()) {
        (Node::Object(oa), Node::Object(ob)) => {
            oa.type_name == ob.type_name
                && oa.len() == ob.len()
                && oa.members().all(|fa| match ob.get(&fa.name) {
                    Some(vb) => eq_value(&fa.value, vb, in_progress),
                    None => false,
                })
        }
        (Node::Seq(sa), Node::Seq(sb)) => {
            sa.len() == sb.len()
                && sa
                    .elements
                    .iter()
                    .zip(&sb.elements)
                    .all(|(ea, eb)| eq_value(ea, eb, in_progress))
        }
        _ => false,
    };

    in_progress.remove(&pair);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SeqKind;

    fn point(x: i64, y: i64) -> NodeRef {
        NodeRef::object("Point")
            .with_member("x", "i64", Value::Int(x))
            .with_member("y", "i64", Value::Int(y))
    }

    #[test]
    fn clone_is_structurally_equal_but_distinct() {
        let original = Value::Node(point(1, 2));
        let copy = deep_clone(&original);
        assert!(structurally_eq(&original, &copy));
        assert_ne!(original, copy, "identities must differ");
    }

    #[test]
    fn clone_preserves_shared_substructure() {
        let shared = point(0, 0);
        let root = NodeRef::object("Pair")
            .with_member("a", "Point", Value::Node(shared.clone()))
            .with_member("b", "Point", Value::Node(shared));

        let copy = deep_clone(&Value::Node(root));
        let copy_node = copy.as_node().unwrap();
        let a = copy_node.get("a").unwrap();
        let b = copy_node.get("b").unwrap();
        assert_eq!(a, b, "shared node stays shared in the clone");
    }

    #[test]
    fn clone_reproduces_cycles() {
        let node = NodeRef::object("Loop").with_member("next", "Loop", Value::Null);
        node.set("next", Value::Node(node.clone()));

        let copy = deep_clone(&Value::Node(node.clone()));
        let copy_node = copy.as_node().unwrap();
        let next = copy_node.get("next").unwrap();
        assert_eq!(
            next.as_node().unwrap().id(),
            copy_node.id(),
            "the clone's cycle points back at the clone"
        );
        assert_ne!(copy_node.id(), node.id());
    }

    #[test]
    fn structural_eq_ignores_member_order() {
        let a = NodeRef::object("P")
            .with_member("x", "i64", Value::Int(1))
            .with_member("y", "i64", Value::Int(2));
        let b = NodeRef::object("P")
            .with_member("y", "i64", Value::Int(2))
            .with_member("x", "i64", Value::Int(1));
        assert!(structurally_eq(&Value::Node(a), &Value::Node(b)));
    }

    #[test]
    fn structural_eq_detects_value_difference() {
        let a = Value::Node(point(1, 2));
        let b = Value::Node(point(1, 3));
        assert!(!structurally_eq(&a, &b));
    }

    #[test]
    fn structural_eq_detects_type_name_difference() {
        let a = NodeRef::object("A").with_member("x", "i64", Value::Int(1));
        let b = NodeRef::object("B").with_member("x", "i64", Value::Int(1));
        assert!(!structurally_eq(&Value::Node(a), &Value::Node(b)));
    }

    #[test]
    fn structural_eq_terminates_on_cycles() {
        let a = NodeRef::object("Loop").with_member("next", "Loop", Value::Null);
        a.set("next", Value::Node(a.clone()));
        let b = NodeRef::object("Loop").with_member("next", "Loop", Value::Null);
        b.set("next", Value::Node(b.clone()));

        assert!(structurally_eq(&Value::Node(a), &Value::Node(b)));
    }

    #[test]
    fn seq_lengths_must_match() {
        let a = NodeRef::seq("Vec<i64>", "i64", SeqKind::Growable, vec![Value::Int(1)]);
        let b = NodeRef::seq(
            "Vec<i64>",
            "i64",
            SeqKind::Growable,
            vec![Value::Int(1), Value::Int(2)],
        );
        assert!(!structurally_eq(&Value::Node(a), &Value::Node(b)));
    }
}
