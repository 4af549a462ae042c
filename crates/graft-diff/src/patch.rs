use serde::{Deserialize, Serialize};

use graft_types::FieldRecord;

/// An ordered set of change records transforming one flattened graph into
/// another.
///
/// A null-valued record is a deletion; any other record assigns the carried
/// value, whether the path existed before (modification) or not (addition).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    records: Vec<FieldRecord>,
}

impl Patch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a patch from records.
    pub fn from_records(records: Vec<FieldRecord>) -> Self {
        Self { records }
    }

    /// The change records, in emission order.
    pub fn records(&self) -> &[FieldRecord] {
        &self.records
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of change records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Number of deletion (null-valued) records.
    pub fn deletions(&self) -> usize {
        self.records.iter().filter(|r| r.is_null()).count()
    }

    /// Number of assignment (non-null) records.
    pub fn assignments(&self) -> usize {
        self.records.iter().filter(|r| !r.is_null()).count()
    }
}

impl IntoIterator for Patch {
    type Item = FieldRecord;
    type IntoIter = std::vec::IntoIter<FieldRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a FieldRecord;
    type IntoIter = std::slice::Iter<'a, FieldRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
