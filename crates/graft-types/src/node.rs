//! Composite nodes: objects with named members and sequence-like values.
//!
//! [`NodeRef`] is the shared handle the whole engine passes around. It is
//! deliberately `Rc`-based (not `Send`): graphs are mutated in place by the
//! patch applier and may contain cycles, so nodes need reference identity
//! that is observable independently of value equality.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Reference identity of a node, derived from its allocation.
///
/// Two `NodeId`s are equal exactly when the two handles point at the same
/// node. Used as the key for cycle detection and merge memoization.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({:#x})", self.0)
    }
}

/// Shared, mutable handle to a composite node.
#[derive(Clone)]
pub struct NodeRef(Rc<RefCell<Node>>);

impl NodeRef {
    /// Wrap a node in a fresh handle with its own identity.
    pub fn new(node: Node) -> Self {
        Self(Rc::new(RefCell::new(node)))
    }

    /// Create an empty object node.
    pub fn object(type_name: impl Into<String>) -> Self {
        Self::new(Node::Object(ObjectNode::new(type_name)))
    }

    /// Create a sequence node from its elements.
    pub fn seq(
        type_name: impl Into<String>,
        element_type: impl Into<String>,
        kind: SeqKind,
        elements: Vec<Value>,
    ) -> Self {
        Self::new(Node::Seq(SeqNode {
            type_name: type_name.into(),
            element_type: element_type.into(),
            kind,
            elements,
        }))
    }

    /// This node's reference identity.
    pub fn id(&self) -> NodeId {
        NodeId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    /// Immutable borrow of the underlying node.
    ///
    /// # Panics
    ///
    /// Panics if the node is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, Node> {
        self.0.borrow()
    }

    /// Mutable borrow of the underlying node.
    ///
    /// # Panics
    ///
    /// Panics if the node is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, Node> {
        self.0.borrow_mut()
    }

    /// The declared type name of the node.
    pub fn type_name(&self) -> String {
        match &*self.borrow() {
            Node::Object(o) => o.type_name.clone(),
            Node::Seq(s) => s.type_name.clone(),
        }
    }

    /// Returns `true` if this is a sequence-like node.
    pub fn is_seq(&self) -> bool {
        matches!(&*self.borrow(), Node::Seq(_))
    }

    /// Returns `true` if this is an object node.
    pub fn is_object(&self) -> bool {
        matches!(&*self.borrow(), Node::Object(_))
    }

    /// Builder-style member insertion; replaces an existing member of the
    /// same name.
    pub fn with_member(
        self,
        name: impl Into<String>,
        declared_type: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        {
            let mut node = self.borrow_mut();
            match &mut *node {
                Node::Object(o) => o.set_member(name, declared_type, value.into()),
                Node::Seq(_) => panic!("with_member called on a sequence node"),
            }
        }
        self
    }

    /// Assign a member's value. Returns `false` if the member does not exist
    /// or the node is a sequence.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> bool {
        let mut node = self.borrow_mut();
        match &mut *node {
            Node::Object(o) => o.assign(name, value.into()),
            Node::Seq(_) => false,
        }
    }

    /// Read a member's value by name.
    pub fn get(&self, name: &str) -> Option<Value> {
        match &*self.borrow() {
            Node::Object(o) => o.get(name).cloned(),
            Node::Seq(_) => None,
        }
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Print identity only; recursive printing would not terminate on
        // cyclic graphs.
        write!(f, "NodeRef({} @ {:?})", self.type_name(), self.id())
    }
}

/// A composite node: an object with named members or a sequence.
#[derive(Clone, Debug)]
pub enum Node {
    /// An object with named, typed members in stable declaration order.
    Object(ObjectNode),
    /// A sequence-like value (array, list, vector).
    Seq(SeqNode),
}

impl Node {
    /// The object view, if this is an object node.
    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            Node::Object(o) => Some(o),
            Node::Seq(_) => None,
        }
    }

    /// Mutable object view.
    pub fn as_object_mut(&mut self) -> Option<&mut ObjectNode> {
        match self {
            Node::Object(o) => Some(o),
            Node::Seq(_) => None,
        }
    }

    /// The sequence view, if this is a sequence node.
    pub fn as_seq(&self) -> Option<&SeqNode> {
        match self {
            Node::Object(_) => None,
            Node::Seq(s) => Some(s),
        }
    }

    /// Mutable sequence view.
    pub fn as_seq_mut(&mut self) -> Option<&mut SeqNode> {
        match self {
            Node::Object(_) => None,
            Node::Seq(s) => Some(s),
        }
    }
}

/// One named member of an object node.
#[derive(Clone, Debug)]
pub struct FieldSlot {
    /// The member name.
    pub name: String,
    /// The declared type name, used to construct default instances when the
    /// patch applier must materialize a missing intermediate node.
    pub declared_type: String,
    /// The current value.
    pub value: Value,
}

/// An object with named members in stable declaration order.
///
/// Member names are unique; `set_member` replaces rather than duplicates.
#[derive(Clone, Debug, Default)]
pub struct ObjectNode {
    /// The object's type name.
    pub type_name: String,
    fields: Vec<FieldSlot>,
}

impl ObjectNode {
    /// Create an empty object of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the object has no members.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Members in declaration order.
    pub fn members(&self) -> impl Iterator<Item = &FieldSlot> {
        self.fields.iter()
    }

    /// Look up a member's value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Look up a member slot by name.
    pub fn slot(&self, name: &str) -> Option<&FieldSlot> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Mutable member slot lookup.
    pub fn slot_mut(&mut self, name: &str) -> Option<&mut FieldSlot> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Declare a member (or replace one of the same name, keeping its
    /// position).
    pub fn set_member(
        &mut self,
        name: impl Into<String>,
        declared_type: impl Into<String>,
        value: Value,
    ) {
        let name = name.into();
        let declared_type = declared_type.into();
        if let Some(slot) = self.slot_mut(&name) {
            slot.declared_type = declared_type;
            slot.value = value;
        } else {
            self.fields.push(FieldSlot {
                name,
                declared_type,
                value,
            });
        }
    }

    /// Assign an existing member's value. Returns `false` if no such member.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        match self.slot_mut(name) {
            Some(slot) => {
                slot.value = value;
                true
            }
            None => false,
        }
    }
}

/// Whether a sequence type can grow in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeqKind {
    /// Fixed-size (array-like): growth allocates a replacement sequence and
    /// rebinds the owner's reference.
    Fixed,
    /// Growable (list-like): growth appends elements in place.
    Growable,
}

/// A sequence-like node: ordered elements of a declared element type.
#[derive(Clone, Debug)]
pub struct SeqNode {
    /// The sequence's own type name.
    pub type_name: String,
    /// The declared element type name.
    pub element_type: String,
    /// Fixed or growable.
    pub kind: SeqKind,
    /// The elements, in order.
    pub elements: Vec<Value>,
}

impl SeqNode {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the sequence has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
