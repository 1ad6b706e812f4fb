//! Keyboard focus bookkeeping.

use crate::id::{InstanceId, NodeId};
use crate::tree::Tree;
use tracing::debug;

/// What happened to focus during a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusChange {
    Unchanged,
    /// The focused node went away and focus moved to this node.
    Moved(NodeId),
    /// The focused node went away and nothing could take focus.
    Cleared,
}

impl Default for FocusChange {
    fn default() -> FocusChange {
        FocusChange::Unchanged
    }
}

/// Holds the focused node.
///
/// The instance is kept alongside the id so a node rebuilt under the same id counts as gone.
#[derive(Debug, Default)]
pub(crate) struct FocusTracker {
    focused: Option<(NodeId, InstanceId)>,
}

impl FocusTracker {
    pub fn focused(&self) -> Option<&NodeId> {
        self.focused.as_ref().map(|(id, _)| id)
    }

    /// Moves focus to a live node that accepts it.
    pub fn request(&mut self, tree: &mut Tree, id: &NodeId) -> bool {
        if self.focused() == Some(id) {
            return true;
        }
        let accepts = tree.is_live(id) && tree.node(id).map_or(false, |node| node.accepts_focus());
        if !accepts {
            return false;
        }
        self.release(tree);
        self.grant(tree, id);
        true
    }

    fn release(&mut self, tree: &mut Tree) {
        if let Some((id, instance)) = self.focused.take() {
            if let Some(node) = tree.node_mut(&id).filter(|node| node.instance == instance) {
                if let Some(focus) = node.component.focusable_mut() {
                    focus.release_focus();
                }
            }
        }
    }

    fn grant(&mut self, tree: &mut Tree, id: &NodeId) {
        if let Some(node) = tree.node_mut(id) {
            if let Some(focus) = node.component.focusable_mut() {
                focus.grab_focus();
            }
            self.focused = Some((id.clone(), node.instance));
        }
    }

    /// Moves focus off a node that is no longer live.
    ///
    /// Walks last-known parents from the focused node and grants focus to the first live node
    /// that accepts it. Must run before latent nodes are destroyed, since the walk goes through
    /// them.
    pub fn restore(&mut self, tree: &mut Tree) -> FocusChange {
        let (id, instance) = match &self.focused {
            Some(focused) => focused.clone(),
            None => return FocusChange::Unchanged,
        };

        let same_instance = tree.node(&id).map_or(false, |node| node.instance == instance);
        if same_instance && tree.is_live(&id) {
            return FocusChange::Unchanged;
        }

        // a rebuilt node is its own first candidate
        let mut candidate = match tree.node(&id) {
            Some(node) if same_instance => node.parent.clone(),
            Some(_) => Some(id.clone()),
            None => None,
        };
        self.release(tree);

        for _ in 0..=tree.len() {
            let current = match candidate {
                Some(current) => current,
                None => break,
            };
            let node = match tree.node(&current) {
                Some(node) => node,
                None => break,
            };
            if tree.is_live(&current) && node.accepts_focus() {
                debug!(from = %id, to = %current, "restoring focus");
                self.grant(tree, &current);
                return FocusChange::Moved(current);
            }
            candidate = node.parent.clone();
        }

        debug!(node = %id, "focused node went away; clearing focus");
        FocusChange::Cleared
    }
}
