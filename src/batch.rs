use crate::focus::FocusChange;
use crate::id::NodeId;
use crate::state::State;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One atomic unit of partial state updates sent by the backend.
///
/// ```json
/// { "updates": { "5": { "type": "Column", "children": [6] }, "6": { "type": "Text" } },
///   "newRootId": 5 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    #[serde(default)]
    pub updates: BTreeMap<NodeId, State>,
    #[serde(default, rename = "newRootId", skip_serializing_if = "Option::is_none")]
    pub new_root: Option<NodeId>,
}

impl Batch {
    pub fn new() -> Batch {
        Batch::default()
    }

    pub fn from_json(json: &str) -> Result<Batch, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Adds a partial state for a node.
    pub fn update(mut self, id: impl Into<NodeId>, state: State) -> Batch {
        self.updates.insert(id.into(), state);
        self
    }

    pub fn with_root(mut self, id: impl Into<NodeId>) -> Batch {
        self.new_root = Some(id.into());
        self
    }
}

/// What a batch did, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Newly created nodes, decorators included.
    pub created: Vec<NodeId>,
    /// Nodes whose component was rebuilt because their type changed.
    pub replaced: Vec<NodeId>,
    /// Nodes whose instance was torn down. A replaced node is listed here too, for its old
    /// instance.
    pub destroyed: Vec<NodeId>,
    /// Entries skipped because they named a node that doesn’t exist.
    pub stale: Vec<NodeId>,
    pub focus: FocusChange,
}
