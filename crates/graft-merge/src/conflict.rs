use std::fmt;

use serde::{Deserialize, Serialize};

use graft_types::Value;

/// What the merger does at a path where base, yours, and theirs disagree
/// irreconcilably.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictResolution {
    /// Collect all conflicts and fail the whole call with them.
    #[default]
    Throw,
    /// Keep the base value at every conflicting path.
    TakeBase,
    /// Keep your value at every conflicting path.
    TakeYours,
    /// Keep their value at every conflicting path.
    TakeTheirs,
}

/// One path where the three branches disagree irreconcilably.
///
/// Built per merge call and either returned in the outcome or carried by
/// the aggregate conflict error; never persisted.
#[derive(Clone, Debug)]
pub struct Conflict {
    /// The leaf path, relative to the merge roots.
    pub path: String,
    /// The base branch's value at the path.
    pub base: Value,
    /// Your branch's value at the path.
    pub yours: Value,
    /// Their branch's value at the path.
    pub theirs: Value,
    /// `true` if the operands are composites compared atomically.
    pub composite: bool,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "<root>" } else { &self.path };
        write!(
            f,
            "conflict at {path}: base={}, yours={}, theirs={}",
            self.base.type_label(),
            self.yours.type_label(),
            self.theirs.type_label()
        )
    }
}
