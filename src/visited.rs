//! Cycle and sharing detection for one traversal.

use std::collections::HashMap;

use crate::idgraph::NodeId;
use crate::types::{FingerprintError, ObjectRef};

/// Identities already entered during the current traversal.
///
/// Append-only. An identity is inserted before any of its children are
/// scheduled, which is what makes self-referential structures terminate.
/// Each entry optionally carries the identity-graph node built for it so a
/// second reference can point at the same node.
#[derive(Debug, Default)]
pub struct VisitedSet {
    entries: HashMap<ObjectRef, Option<NodeId>>,
}

impl VisitedSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an identity. `Some(node)` means already visited.
    pub fn get(&self, object: &ObjectRef) -> Option<Option<NodeId>> {
        self.entries.get(object).copied()
    }

    /// Register an identity. Returns `false` if it was already present, in
    /// which case the existing entry is kept.
    pub fn insert(&mut self, object: ObjectRef, node: Option<NodeId>) -> Result<bool, FingerprintError> {
        if self.entries.contains_key(&object) {
            return Ok(false);
        }
        self.entries.try_reserve(1).map_err(FingerprintError::from_alloc)?;
        self.entries.insert(object, node);
        Ok(true)
    }

    /// Number of identities registered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was registered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
