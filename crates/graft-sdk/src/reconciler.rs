use tracing::debug;

use graft_diff::Patch;
use graft_merge::{MergeOptions, MergeOutcome};
use graft_types::{FieldRecord, TypeRegistry, Value};

use crate::error::SdkResult;

/// High-level reconciliation API.
///
/// Bundles the four engine operations with the host's [`TypeRegistry`] so
/// callers do not thread the registry through every patch replay. All
/// operations are synchronous and free of shared state; the reconciler
/// itself holds nothing but the registry.
#[derive(Debug, Default)]
pub struct Reconciler {
    registry: TypeRegistry,
}

impl Reconciler {
    /// A reconciler with an empty type registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A reconciler over the given registry.
    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self { registry }
    }

    /// The registry, for registering further factories.
    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    /// Flatten a graph into ordered (path, leaf value) records.
    pub fn flatten(&self, graph: &Value) -> SdkResult<Vec<FieldRecord>> {
        Ok(graft_flatten::flatten(graph)?)
    }

    /// Diff two graphs, flattening both first.
    pub fn diff(&self, left: &Value, right: &Value) -> SdkResult<Patch> {
        let left_records = graft_flatten::flatten(left)?;
        let right_records = graft_flatten::flatten(right)?;
        let patch = graft_diff::diff(&left_records, &right_records);
        debug!(changes = patch.len(), "computed diff");
        Ok(patch)
    }

    /// Diff two already-flattened graphs.
    pub fn diff_flattened(&self, left: &[FieldRecord], right: &[FieldRecord]) -> Patch {
        graft_diff::diff(left, right)
    }

    /// Replay a patch onto a graph in place.
    pub fn apply(&self, patch: &Patch, target: &Value) -> SdkResult<()> {
        graft_patch::apply(patch, target, &self.registry)?;
        Ok(())
    }

    /// Three-way merge of base/yours/theirs graphs.
    pub fn merge(
        &self,
        base: &Value,
        yours: &Value,
        theirs: &Value,
        options: &MergeOptions,
    ) -> SdkResult<MergeOutcome> {
        Ok(graft_merge::three_way_merge(base, yours, theirs, options)?)
    }
}
