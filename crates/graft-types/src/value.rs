use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node::NodeRef;

/// A position in an object graph: either a leaf or a composite node.
///
/// Leaf variants compare by value. `Node` compares by reference identity —
/// two handles are equal only if they point at the same node. Structural
/// comparison of composites is [`structurally_eq`](crate::structurally_eq).
#[derive(Clone, Debug)]
pub enum Value {
    /// The absence of a value.
    Null,
    /// A boolean scalar.
    Bool(bool),
    /// A signed integer scalar.
    Int(i64),
    /// A floating-point scalar.
    Float(f64),
    /// A string.
    Text(String),
    /// A composite node (object or sequence).
    Node(NodeRef),
}

impl Value {
    /// Returns `true` if this is `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if this is a composite node.
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Node(_))
    }

    /// The leaf view of this value, or `None` for composites.
    pub fn as_leaf(&self) -> Option<LeafValue> {
        match self {
            Value::Null => Some(LeafValue::Null),
            Value::Bool(b) => Some(LeafValue::Bool(*b)),
            Value::Int(i) => Some(LeafValue::Int(*i)),
            Value::Float(f) => Some(LeafValue::Float(*f)),
            Value::Text(s) => Some(LeafValue::Text(s.clone())),
            Value::Node(_) => None,
        }
    }

    /// The node handle, or `None` for leaves.
    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    /// A short description of the runtime type, for diagnostics.
    pub fn type_label(&self) -> String {
        match self {
            Value::Null => "null".into(),
            Value::Bool(_) => "bool".into(),
            Value::Int(_) => "int".into(),
            Value::Float(_) => "float".into(),
            Value::Text(_) => "text".into(),
            Value::Node(n) => n.type_name(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => a.id() == b.id(),
            _ => false,
        }
    }
}

impl From<LeafValue> for Value {
    fn from(leaf: LeafValue) -> Self {
        match leaf {
            LeafValue::Null => Value::Null,
            LeafValue::Bool(b) => Value::Bool(b),
            LeafValue::Int(i) => Value::Int(i),
            LeafValue::Float(f) => Value::Float(f),
            LeafValue::Text(s) => Value::Text(s),
        }
    }
}

impl From<NodeRef> for Value {
    fn from(node: NodeRef) -> Self {
        Value::Node(node)
    }
}

/// A scalar, string, or null stored at one path of a flattened graph.
///
/// Never a composite: flattening recurses into composites rather than
/// recording them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeafValue {
    /// The absence of a value.
    Null,
    /// A boolean scalar.
    Bool(bool),
    /// A signed integer scalar.
    Int(i64),
    /// A floating-point scalar.
    Float(f64),
    /// A string.
    Text(String),
}

impl LeafValue {
    /// Returns `true` if this is `LeafValue::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, LeafValue::Null)
    }
}

impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafValue::Null => write!(f, "null"),
            LeafValue::Bool(b) => write!(f, "{b}"),
            LeafValue::Int(i) => write!(f, "{i}"),
            LeafValue::Float(x) => write!(f, "{x}"),
            LeafValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeRef, ObjectNode};

    #[test]
    fn leaf_values_compare_by_value() {
        assert_eq!(Value::Int(42), Value::Int(42));
        assert_ne!(Value::Int(42), Value::Int(43));
        assert_ne!(Value::Int(1), Value::Text("1".into()));
        assert_eq!(Value::Null, Value::Null);
    }

    #[test]
    fn nodes_compare_by_identity() {
        let a = NodeRef::new(Node::Object(ObjectNode::new("Point")));
        let b = NodeRef::new(Node::Object(ObjectNode::new("Point")));
        assert_eq!(Value::Node(a.clone()), Value::Node(a.clone()));
        assert_ne!(Value::Node(a), Value::Node(b));
    }

    #[test]
    fn as_leaf_rejects_composites() {
        let node = NodeRef::new(Node::Object(ObjectNode::new("Point")));
        assert!(Value::Node(node).as_leaf().is_none());
        assert_eq!(Value::Int(7).as_leaf(), Some(LeafValue::Int(7)));
    }

    #[test]
    fn leaf_roundtrips_through_value() {
        let leaf = LeafValue::Text("hello".into());
        let value: Value = leaf.clone().into();
        assert_eq!(value.as_leaf(), Some(leaf));
    }

    #[test]
    fn leaf_serde_shape_is_plain_json() {
        assert_eq!(serde_json::to_string(&LeafValue::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&LeafValue::Int(5)).unwrap(), "5");
        assert_eq!(
            serde_json::to_string(&LeafValue::Text("x".into())).unwrap(),
            "\"x\""
        );
    }

    #[test]
    fn type_label_names_scalars_and_nodes() {
        assert_eq!(Value::Bool(true).type_label(), "bool");
        let node = NodeRef::new(Node::Object(ObjectNode::new("Config")));
        assert_eq!(Value::Node(node).type_label(), "Config");
    }
}
