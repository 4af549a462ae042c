//! The composite-as-leaf encode/decode pair.
//!
//! The merger never merges sequence-like composites element by element;
//! it encodes each operand into a canonical string, merges the strings like
//! scalars, and decodes the winner. The codec is an injected dependency so
//! hosts can bind it to their own serializer; [`JsonCodec`] is the default.

use std::collections::HashSet;

use graft_types::{Node, NodeId, NodeRef, ObjectNode, SeqKind, SeqNode, Value};

/// Errors that can occur in the atomic codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The composite contains a reference cycle and has no finite encoding.
    #[error("cannot encode cyclic composite")]
    CyclicComposite,

    /// A float had no canonical JSON form (NaN or infinity).
    #[error("cannot encode non-finite float")]
    NonFiniteFloat,

    /// Underlying JSON error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// The decoded text did not describe a composite.
    #[error("decoded text is not a composite: {0}")]
    NotComposite(String),
}

/// Encode/decode pair used to treat a composite value as one opaque
/// comparison unit.
///
/// Requirements on implementations: encoding is deterministic (structurally
/// equal composites yield identical strings) and `decode` inverts `encode`
/// up to structural equality.
pub trait AtomicCodec {
    /// Encode a composite into its canonical string form.
    fn encode(&self, node: &NodeRef) -> Result<String, CodecError>;

    /// Decode a canonical string back into a composite of the given type.
    fn decode(&self, text: &str, type_name: &str) -> Result<NodeRef, CodecError>;
}

/// The default codec: canonical JSON with reserved `@`-keys carrying the
/// type metadata JSON itself cannot express.
///
/// Objects become `{"@object": type, "fields": {...}}` with fields in
/// sorted-key order, sequences become `{"@seq": type, "@elem": type,
/// "@growable": bool, "items": [...]}`. Member declared-type names are not
/// preserved; decoded members carry the runtime type of their value.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Create the codec.
    pub fn new() -> Self {
        Self
    }
}

impl AtomicCodec for JsonCodec {
    fn encode(&self, node: &NodeRef) -> Result<String, CodecError> {
        let mut ancestors = HashSet::new();
        let json = encode_node(node, &mut ancestors)?;
        Ok(serde_json::to_string(&json)?)
    }

    fn decode(&self, text: &str, type_name: &str) -> Result<NodeRef, CodecError> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        match decode_value(&json, type_name)? {
            Value::Node(node) => Ok(node),
            other => Err(CodecError::NotComposite(other.type_label())),
        }
    }
}

fn encode_node(
    node: &NodeRef,
    ancestors: &mut HashSet<NodeId>,
) -> Result<serde_json::Value, CodecError> {
    if !ancestors.insert(node.id()) {
        return Err(CodecError::CyclicComposite);
    }

    let json = match &*node.borrow() {
        Node::Object(object) => {
            let mut fields = serde_json::Map::new();
            for member in object.members() {
                fields.insert(member.name.clone(), encode_value(&member.value, ancestors)?);
            }
            let mut map = serde_json::Map::new();
            map.insert("@object".into(), object.type_name.clone().into());
            map.insert("fields".into(), serde_json::Value::Object(fields));
            serde_json::Value::Object(map)
        }
        Node::Seq(seq) => {
            let mut items = Vec::with_capacity(seq.len());
            for element in &seq.elements {
                items.push(encode_value(element, ancestors)?);
            }
            let mut map = serde_json::Map::new();
            map.insert("@seq".into(), seq.type_name.clone().into());
            map.insert("@elem".into(), seq.element_type.clone().into());
            map.insert(
                "@growable".into(),
                (seq.kind == SeqKind::Growable).into(),
            );
            map.insert("items".into(), serde_json::Value::Array(items));
            serde_json::Value::Object(map)
        }
    };

    ancestors.remove(&node.id());
    Ok(json)
}

fn encode_value(
    value: &Value,
    ancestors: &mut HashSet<NodeId>,
) -> Result<serde_json::Value, CodecError> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => (*b).into(),
        Value::Int(i) => (*i).into(),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .ok_or(CodecError::NonFiniteFloat)?
            .into(),
        Value::Text(s) => s.clone().into(),
        Value::Node(node) => encode_node(node, ancestors)?,
    })
}

fn decode_value(json: &serde_json::Value, type_name: &str) -> Result<Value, CodecError> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Array(_) => {
            return Err(CodecError::NotComposite(
                "bare array without sequence metadata".into(),
            ));
        }
        serde_json::Value::Object(map) => {
            if let Some(name) = map.get("@object").and_then(|v| v.as_str()) {
                let name = if name.is_empty() { type_name } else { name };
                let mut object = ObjectNode::new(name);
                if let Some(serde_json::Value::Object(fields)) = map.get("fields") {
                    for (field, value) in fields {
                        let decoded = decode_value(value, "")?;
                        let declared = decoded.type_label();
                        object.set_member(field.clone(), declared, decoded);
                    }
                }
                Value::Node(NodeRef::new(Node::Object(object)))
            } else if let Some(name) = map.get("@seq").and_then(|v| v.as_str()) {
                let name = if name.is_empty() { type_name } else { name };
                let element_type = map
                    .get("@elem")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();
                let kind = if map.get("@growable").and_then(|v| v.as_bool()).unwrap_or(true) {
                    SeqKind::Growable
                } else {
                    SeqKind::Fixed
                };
                let mut elements = Vec::new();
                if let Some(serde_json::Value::Array(items)) = map.get("items") {
                    for item in items {
                        elements.push(decode_value(item, "")?);
                    }
                }
                Value::Node(NodeRef::new(Node::Seq(SeqNode {
                    type_name: name.to_string(),
                    element_type,
                    kind,
                    elements,
                })))
            } else {
                return Err(CodecError::NotComposite(
                    "object without @object/@seq metadata".into(),
                ));
            }
        }
    })
}
