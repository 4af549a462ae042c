//! The recursive three-way merge algorithm.
//!
//! Case order at every path, mirroring the scalar rule "agreement wins,
//! single-sided change wins, everything else is a conflict":
//!
//! 1. all operands null — null;
//! 2. non-null operands of differing runtime type — abort with a type
//!    mismatch;
//! 3. all scalars/strings — inline scalar rule;
//! 4. all sequence-like — atomic: encode, merge the strings, decode;
//! 5. one or two nulls — creation/deletion rules, including the
//!    deleted-vs-modified conflict;
//! 6. all objects — member-wise recursion with identity memoization.
//!
//! The memoization (base identity → merge result, registered *before*
//! recursing) is what makes shared and cyclic substructure merge once,
//! consistently, and terminate.

use std::collections::HashMap;

use tracing::debug;

use graft_types::{Node, NodeId, NodeRef, Value};

use crate::codec::{AtomicCodec, JsonCodec};
use crate::conflict::{Conflict, ConflictResolution};
use crate::error::{MergeError, MergeResult};

/// Configuration for one merge call: the conflict policy and the injected
/// composite-as-leaf codec.
pub struct MergeOptions {
    /// The conflict resolution policy.
    pub policy: ConflictResolution,
    codec: Box<dyn AtomicCodec>,
}

impl MergeOptions {
    /// Options with the given policy and the default [`JsonCodec`].
    pub fn new(policy: ConflictResolution) -> Self {
        Self {
            policy,
            codec: Box::new(JsonCodec::new()),
        }
    }

    /// Replace the atomic codec.
    pub fn with_codec(mut self, codec: impl AtomicCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self::new(ConflictResolution::Throw)
    }
}

impl std::fmt::Debug for MergeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeOptions")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// The result of a successful merge call.
#[derive(Debug)]
pub struct MergeOutcome {
    /// The merged graph, containing policy-resolved values at conflict
    /// points for the non-throwing policies.
    pub value: Value,
    /// Every conflict encountered. Empty unless a non-throwing policy
    /// resolved some disagreements.
    pub conflicts: Vec<Conflict>,
}

/// Three-way merge of base/yours/theirs graphs.
///
/// Under [`ConflictResolution::Throw`] any conflict fails the call with
/// [`MergeError::Conflicts`] carrying the full list; the other policies
/// resolve conflicts in place and report them in the outcome.
pub fn three_way_merge(
    base: &Value,
    yours: &Value,
    theirs: &Value,
    options: &MergeOptions,
) -> MergeResult<MergeOutcome> {
    let mut merger = Merger {
        options,
        conflicts: Vec::new(),
        visited: HashMap::new(),
    };
    let value = merger.merge(base, yours, theirs, "")?;

    if !merger.conflicts.is_empty() && options.policy == ConflictResolution::Throw {
        return Err(MergeError::Conflicts(merger.conflicts));
    }
    Ok(MergeOutcome {
        value,
        conflicts: merger.conflicts,
    })
}

struct Merger<'a> {
    options: &'a MergeOptions,
    conflicts: Vec<Conflict>,
    /// Base-node identity → already-computed merge result.
    visited: HashMap<NodeId, NodeRef>,
}

impl Merger<'_> {
    fn merge(
        &mut self,
        base: &Value,
        yours: &Value,
        theirs: &Value,
        path: &str,
    ) -> MergeResult<Value> {
        if base.is_null() && yours.is_null() && theirs.is_null() {
            return Ok(Value::Null);
        }
        check_types(base, yours, theirs, path)?;

        match (base.is_null(), yours.is_null(), theirs.is_null()) {
            (false, false, false) => self.merge_present(base, yours, theirs, path),
            // Independent deletion on both sides: no conflict.
            (false, true, true) => Ok(Value::Null),
            // Only one branch created the value.
            (true, true, false) => Ok(theirs.clone()),
            (true, false, true) => Ok(yours.clone()),
            (true, false, false) => self.merge_double_creation(yours, theirs, path),
            (false, true, false) => self.merge_one_deleted(base, yours, theirs, path, Side::Yours),
            (false, false, true) => self.merge_one_deleted(base, yours, theirs, path, Side::Theirs),
            (true, true, true) => unreachable!("all-null handled above"),
        }
    }

    /// All three operands present and of one runtime type.
    fn merge_present(
        &mut self,
        base: &Value,
        yours: &Value,
        theirs: &Value,
        path: &str,
    ) -> MergeResult<Value> {
        match (base, yours, theirs) {
            (Value::Node(b), Value::Node(y), Value::Node(t)) => {
                if b.is_seq() {
                    self.merge_atomic(b, y, t, path)
                } else {
                    self.merge_objects(b, y, t, path)
                }
            }
            _ => self.merge_scalars(base, yours, theirs, path),
        }
    }

    /// The scalar rule. Agreement between yours and theirs wins even when
    /// both diverged from base the same way.
    fn merge_scalars(
        &mut self,
        base: &Value,
        yours: &Value,
        theirs: &Value,
        path: &str,
    ) -> MergeResult<Value> {
        if yours == theirs {
            return Ok(yours.clone());
        }
        if base == yours {
            return Ok(theirs.clone());
        }
        if base == theirs {
            return Ok(yours.clone());
        }
        Ok(self.record_conflict(path, base.clone(), yours.clone(), theirs.clone(), false))
    }

    /// Sequence-like composites merge as one opaque unit: canonical strings
    /// in, the scalar rule over the strings, the winner decoded back out.
    fn merge_atomic(
        &mut self,
        base: &NodeRef,
        yours: &NodeRef,
        theirs: &NodeRef,
        path: &str,
    ) -> MergeResult<Value> {
        let codec = self.options.codec.as_ref();
        let base_text = codec.encode(base)?;
        let your_text = codec.encode(yours)?;
        let their_text = codec.encode(theirs)?;

        let winner = if your_text == their_text {
            your_text
        } else if base_text == your_text {
            their_text
        } else if base_text == their_text {
            your_text
        } else {
            self.push_conflict(
                path,
                Value::Node(base.clone()),
                Value::Node(yours.clone()),
                Value::Node(theirs.clone()),
                true,
            );
            match self.options.policy {
                ConflictResolution::Throw => return Ok(Value::Null),
                ConflictResolution::TakeBase => base_text,
                ConflictResolution::TakeYours => your_text,
                ConflictResolution::TakeTheirs => their_text,
            }
        };

        let decoded = codec.decode(&winner, &base.type_name())?;
        Ok(Value::Node(decoded))
    }

    /// Base is null, both branches created a value independently.
    fn merge_double_creation(
        &mut self,
        yours: &Value,
        theirs: &Value,
        path: &str,
    ) -> MergeResult<Value> {
        match (yours, theirs) {
            (Value::Node(y), Value::Node(t)) => {
                let codec = self.options.codec.as_ref();
                let your_text = codec.encode(y)?;
                let their_text = codec.encode(t)?;
                if your_text == their_text {
                    return Ok(Value::Node(codec.decode(&your_text, &y.type_name())?));
                }
                self.push_conflict(path, Value::Null, yours.clone(), theirs.clone(), true);
                let winner = match self.options.policy {
                    ConflictResolution::Throw | ConflictResolution::TakeBase => {
                        return Ok(Value::Null);
                    }
                    ConflictResolution::TakeYours => your_text,
                    ConflictResolution::TakeTheirs => their_text,
                };
                Ok(Value::Node(codec.decode(&winner, &y.type_name())?))
            }
            _ => {
                if yours == theirs {
                    return Ok(yours.clone());
                }
                Ok(self.record_conflict(path, Value::Null, yours.clone(), theirs.clone(), false))
            }
        }
    }

    /// One branch deleted, the other kept (and possibly modified) the value.
    /// An unmodified survivor honors the deletion; a modified one conflicts.
    fn merge_one_deleted(
        &mut self,
        base: &Value,
        yours: &Value,
        theirs: &Value,
        path: &str,
        deleted_by: Side,
    ) -> MergeResult<Value> {
        let survivor = match deleted_by {
            Side::Yours => theirs,
            Side::Theirs => yours,
        };

        let unchanged = match (base, survivor) {
            (Value::Node(b), Value::Node(s)) => {
                let codec = self.options.codec.as_ref();
                codec.encode(b)? == codec.encode(s)?
            }
            _ => base == survivor,
        };
        if unchanged {
            return Ok(Value::Null);
        }

        debug!(path = %path, side = deleted_by.name(), "deleted-vs-modified conflict");
        Ok(self.record_conflict(
            path,
            base.clone(),
            yours.clone(),
            theirs.clone(),
            base.is_composite(),
        ))
    }

    /// Member-wise recursion over three objects of one type.
    fn merge_objects(
        &mut self,
        base: &NodeRef,
        yours: &NodeRef,
        theirs: &NodeRef,
        path: &str,
    ) -> MergeResult<Value> {
        if let Some(existing) = self.visited.get(&base.id()) {
            return Ok(Value::Node(existing.clone()));
        }

        let result = NodeRef::object(base.type_name());
        // Memoize before recursing so cyclic references resolve to the
        // result under construction.
        self.visited.insert(base.id(), result.clone());

        let members: Vec<(String, String, Value)> = {
            let node = base.borrow();
            let object = node.as_object().expect("merge_objects takes objects");
            object
                .members()
                .map(|m| (m.name.clone(), m.declared_type.clone(), m.value.clone()))
                .collect()
        };

        for (name, declared_type, base_value) in members {
            let your_value = yours.get(&name).ok_or_else(|| MergeError::MissingMember {
                path: path.to_string(),
                member: name.clone(),
            })?;
            let their_value = theirs.get(&name).ok_or_else(|| MergeError::MissingMember {
                path: path.to_string(),
                member: name.clone(),
            })?;

            let child_path = if path.is_empty() {
                name.clone()
            } else {
                format!("{path}.{name}")
            };
            let merged = self.merge(&base_value, &your_value, &their_value, &child_path)?;

            result
                .borrow_mut()
                .as_object_mut()
                .expect("result is an object")
                .set_member(name, declared_type, merged);
        }

        Ok(Value::Node(result))
    }

    /// Record a conflict and return the policy-resolved value (null under
    /// `Throw`; the aggregate error is raised at the top level).
    fn record_conflict(
        &mut self,
        path: &str,
        base: Value,
        yours: Value,
        theirs: Value,
        composite: bool,
    ) -> Value {
        let resolved = match self.options.policy {
            ConflictResolution::Throw => Value::Null,
            ConflictResolution::TakeBase => base.clone(),
            ConflictResolution::TakeYours => yours.clone(),
            ConflictResolution::TakeTheirs => theirs.clone(),
        };
        self.push_conflict(path, base, yours, theirs, composite);
        resolved
    }

    fn push_conflict(
        &mut self,
        path: &str,
        base: Value,
        yours: Value,
        theirs: Value,
        composite: bool,
    ) {
        debug!(path = %path, composite, "recorded merge conflict");
        self.conflicts.push(Conflict {
            path: path.to_string(),
            base,
            yours,
            theirs,
            composite,
        });
    }
}

#[derive(Clone, Copy)]
enum Side {
    Yours,
    Theirs,
}

impl Side {
    fn name(self) -> &'static str {
        match self {
            Side::Yours => "yours",
            Side::Theirs => "theirs",
        }
    }
}

/// Non-null operands must share one runtime type; anything else aborts.
fn check_types(base: &Value, yours: &Value, theirs: &Value, path: &str) -> MergeResult<()> {
    let mut present = [base, yours, theirs]
        .into_iter()
        .filter(|v| !v.is_null())
        .map(runtime_type);

    let first = match present.next() {
        Some(t) => t,
        None => return Ok(()),
    };
    for other in present {
        if other != first {
            return Err(MergeError::TypeMismatch {
                path: path.to_string(),
                left: first,
                right: other,
            });
        }
    }
    Ok(())
}

fn runtime_type(value: &Value) -> String {
    match value {
        Value::Node(node) => match &*node.borrow() {
            Node::Object(o) => format!("object {}", o.type_name),
            Node::Seq(s) => format!("sequence {}", s.type_name),
        },
        leaf => leaf.type_label(),
    }
}
