//! Tooling-only node flags, kept out of the node record.

use crate::id::NodeId;
use crate::state::{State, INTERNAL_KEY};
use serde_json::Value;
use std::collections::HashMap;

/// Per-node debug flags set through the reserved `internal` property.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DebugTable {
    internal: HashMap<NodeId, bool>,
}

impl DebugTable {
    /// True if the backend marked this node as internal.
    pub fn is_internal(&self, id: &NodeId) -> bool {
        self.internal.get(id).copied().unwrap_or(false)
    }

    /// All nodes currently marked internal.
    pub fn internal_nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.internal
            .iter()
            .filter(|(_, internal)| **internal)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.internal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.internal.is_empty()
    }

    /// Reads the flag out of a node’s state.
    pub(crate) fn update(&mut self, id: &NodeId, state: &State) {
        match state.get(INTERNAL_KEY) {
            None | Some(Value::Null) => {
                self.internal.remove(id);
            }
            Some(value) => {
                let internal = value.as_bool().unwrap_or_else(|| {
                    tracing::warn!(node = %id, %value, "ignoring malformed internal flag");
                    false
                });
                self.internal.insert(id.clone(), internal);
            }
        }
    }

    pub(crate) fn remove(&mut self, id: &NodeId) {
        self.internal.remove(id);
    }
}
