use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::LeafValue;

/// One (path, leaf value) entry of a flattened graph.
///
/// Paths are unique within one flattened graph. The shape of this record is
/// wire-stable: callers compare records across calls within one merge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    /// Dot/bracket path addressing one leaf location.
    pub path: String,
    /// The leaf value at that location.
    pub value: LeafValue,
}

impl FieldRecord {
    /// Create a record.
    pub fn new(path: impl Into<String>, value: LeafValue) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }

    /// A deletion record: a null value at the path.
    pub fn deletion(path: impl Into<String>) -> Self {
        Self::new(path, LeafValue::Null)
    }

    /// Returns `true` if this record carries a null value.
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

impl fmt::Display for FieldRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.path, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deletion_is_null_valued() {
        let rec = FieldRecord::deletion("a.b");
        assert!(rec.is_null());
        assert_eq!(rec.path, "a.b");
    }

    #[test]
    fn display_is_path_equals_value() {
        let rec = FieldRecord::new("pos[0]", LeafValue::Int(7));
        assert_eq!(rec.to_string(), "pos[0] = 7");
    }

    #[test]
    fn serde_roundtrip() {
        let rec = FieldRecord::new("name", LeafValue::Text("ada".into()));
        let json = serde_json::to_string(&rec).unwrap();
        let parsed: FieldRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, parsed);
    }
}
