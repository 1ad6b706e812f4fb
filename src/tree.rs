//! Node storage and the structural operations on it.
//!
//! Every node is owned by exactly one of: its parent’s child list, the latent pool, or the root
//! slot. Moving a node between these is the only ownership transfer there is. Nodes in the
//! latent pool keep their (owned) subtrees and their last-known parent, and are destroyed at the
//! end of the batch unless they are reattached first.

use crate::id::NodeId;
use crate::node::Node;
use crate::rect::Rect;
use cgmath::{EuclideanSpace, Point2, Vector2, Zero};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::mem;
use tracing::{debug, warn};

/// A tree of nodes, plus the latent pool.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: HashMap<NodeId, Node>,
    root: Option<NodeId>,
    latent: BTreeSet<NodeId>,
}

impl Tree {
    pub(crate) fn new() -> Tree {
        Tree::default()
    }

    pub fn root(&self) -> Option<&NodeId> {
        self.root.as_ref()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes, including latent ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Returns the child list of a node, or an empty list if there is no such node.
    pub fn children(&self, id: &NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |node| &node.children)
    }

    /// True if the node is directly held by the latent pool.
    pub fn is_latent(&self, id: &NodeId) -> bool {
        self.latent.contains(id)
    }

    /// The node whose child list owns this node.
    ///
    /// Unlike [`Node::parent`], this is `None` for the root and for latent nodes.
    pub fn owner(&self, id: &NodeId) -> Option<&NodeId> {
        if self.latent.contains(id) || self.root.as_ref() == Some(id) {
            return None;
        }
        self.nodes.get(id)?.parent.as_ref()
    }

    /// True if the node is reachable from the root.
    pub fn is_live(&self, id: &NodeId) -> bool {
        let mut current = id;
        // bounded by the number of nodes, since ownership can’t contain cycles
        for _ in 0..=self.nodes.len() {
            if self.root.as_ref() == Some(current) {
                return true;
            }
            match self.owner(current) {
                Some(owner) => current = owner,
                None => return false,
            }
        }
        false
    }

    /// Collects the subtree below a node, pre-order, including the node itself.
    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev().cloned());
                out.push(id);
            }
        }
        out
    }

    /// The rectangle a live node occupies, in root coordinates.
    pub fn frame(&self, id: &NodeId) -> Option<Rect> {
        if !self.is_live(id) {
            return None;
        }
        let node = self.nodes.get(id)?;
        let mut origin = Vector2::zero();
        let mut current = Some(id);
        while let Some(id) = current {
            origin += self.nodes.get(id)?.layout.offset;
            current = self.owner(id);
        }
        Some(Rect::new(Point2::from_vec(origin), node.layout.allocated))
    }

    /// Adds a freshly created node. It starts out in the latent pool.
    pub(crate) fn insert(&mut self, node: Node) {
        let id = node.id.clone();
        debug_assert!(!self.nodes.contains_key(&id), "node {:?} inserted twice", id);
        self.nodes.insert(id.clone(), node);
        self.latent.insert(id);
    }

    /// Marks a node dirty, along with all its ancestors up to the first one that already is.
    pub(crate) fn mark_dirty(&mut self, id: &NodeId) {
        match self.nodes.get_mut(id) {
            Some(node) => node.layout.dirty = true,
            None => return,
        }
        let mut current = self.owner(id).cloned();
        while let Some(id) = current {
            let node = match self.nodes.get_mut(&id) {
                Some(node) => node,
                None => break,
            };
            if node.layout.dirty {
                break;
            }
            node.layout.dirty = true;
            current = self.owner(&id).cloned();
        }
    }

    /// True if `ancestor` is `id` or owns it, directly or indirectly.
    fn owns(&self, ancestor: &NodeId, id: &NodeId) -> bool {
        let mut current = Some(id);
        for _ in 0..=self.nodes.len() {
            match current {
                Some(id) if id == ancestor => return true,
                Some(id) => current = self.owner(id),
                None => return false,
            }
        }
        false
    }

    /// Takes a node away from whatever currently owns it, leaving it unowned.
    fn release(&mut self, id: &NodeId) {
        if self.latent.remove(id) {
            return;
        }
        if self.root.as_ref() == Some(id) {
            debug!(node = %id, "moving root node below another node");
            self.root = None;
            return;
        }
        if let Some(owner) = self.owner(id).cloned() {
            debug!(node = %id, from = %owner, "re-parenting node");
            if let Some(owner_node) = self.nodes.get_mut(&owner) {
                owner_node.children.retain(|child| child != id);
            }
            self.mark_dirty(&owner);
        }
    }

    /// Replaces a node’s children.
    ///
    /// Children that stay keep their instance and are never detached, even if they move.
    /// Removed children go to the latent pool; added children are taken from wherever they are.
    /// Unknown, duplicate and cyclic references are dropped.
    ///
    /// Returns true if the child list changed.
    pub(crate) fn set_children(&mut self, parent: &NodeId, requested: Vec<NodeId>) -> bool {
        let old = match self.nodes.get(parent) {
            Some(node) => node.children.clone(),
            None => return false,
        };
        let old_set: HashSet<&NodeId> = old.iter().collect();

        let mut seen = HashSet::new();
        let mut new = Vec::with_capacity(requested.len());
        for id in requested {
            if !seen.insert(id.clone()) {
                warn!(node = %parent, child = %id, "dropping duplicate child reference");
            } else if !self.nodes.contains_key(&id) {
                warn!(node = %parent, child = %id, "skipping reference to nonexistent node");
            } else if !old_set.contains(&id) && self.owns(&id, parent) {
                warn!(node = %parent, child = %id, "dropping child reference that would form a cycle");
            } else {
                new.push(id);
            }
        }

        if new == old {
            return false;
        }

        let new_set: HashSet<&NodeId> = new.iter().collect();
        for id in old.iter().filter(|id| !new_set.contains(id)) {
            debug!(node = %id, from = %parent, "moving node to the latent pool");
            self.latent.insert(id.clone());
        }
        for id in new.iter().filter(|id| !old_set.contains(id)) {
            self.release(id);
            if let Some(node) = self.nodes.get_mut(id) {
                node.parent = Some(parent.clone());
            }
        }

        if let Some(node) = self.nodes.get_mut(parent) {
            node.children = new;
        }
        self.mark_dirty(parent);
        true
    }

    /// Points the root slot at another node. The previous root goes to the latent pool.
    pub(crate) fn set_root(&mut self, id: &NodeId) -> bool {
        if self.root.as_ref() == Some(id) {
            return false;
        }
        if !self.nodes.contains_key(id) {
            warn!(node = %id, "ignoring root replacement with nonexistent node");
            return false;
        }
        self.release(id);
        if let Some(old) = self.root.take() {
            debug!(node = %old, "moving replaced root to the latent pool");
            self.latent.insert(old);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = None;
        }
        self.root = Some(id.clone());
        self.mark_dirty(id);
        true
    }

    /// Removes every latent node and its subtree from the tree, returning them.
    ///
    /// Each node is returned exactly once; the latent pool is empty afterwards.
    pub(crate) fn drain_latent(&mut self) -> Vec<Node> {
        let mut stack: Vec<NodeId> = mem::take(&mut self.latent).into_iter().rev().collect();
        let mut destroyed = Vec::new();
        while let Some(id) = stack.pop() {
            let node = self.nodes.remove(&id);
            debug_assert!(node.is_some(), "node {:?} destroyed twice", id);
            if let Some(node) = node {
                stack.extend(node.children.iter().rev().cloned());
                destroyed.push(node);
            }
        }
        destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Stack;
    use crate::state::State;

    fn tree_with(ids: &[&str]) -> Tree {
        let mut tree = Tree::new();
        for id in ids {
            tree.insert(Node::new(
                NodeId::from(*id),
                "Stack".into(),
                State::new(),
                Box::new(Stack),
            ));
        }
        tree
    }

    fn ids(ids: &[&str]) -> Vec<NodeId> {
        ids.iter().map(|id| NodeId::from(*id)).collect()
    }

    fn clean(tree: &mut Tree) {
        let all: Vec<NodeId> = tree.ids().cloned().collect();
        for id in all {
            tree.node_mut(&id).unwrap().layout.dirty = false;
        }
    }

    #[test]
    fn new_nodes_start_latent() {
        let mut tree = tree_with(&["r", "a"]);
        assert!(tree.is_latent(&"a".into()));
        assert!(!tree.is_live(&"a".into()));

        tree.set_root(&"r".into());
        tree.set_children(&"r".into(), ids(&["a"]));
        assert!(tree.is_live(&"a".into()));
        assert!(!tree.is_latent(&"a".into()));
        assert_eq!(tree.owner(&"a".into()), Some(&NodeId::from("r")));
    }

    #[test]
    fn removed_children_keep_their_last_parent() {
        let mut tree = tree_with(&["r", "a", "b"]);
        tree.set_root(&"r".into());
        tree.set_children(&"r".into(), ids(&["a", "b"]));
        tree.set_children(&"r".into(), ids(&["b"]));

        let a = NodeId::from("a");
        assert!(tree.is_latent(&a));
        assert_eq!(tree.node(&a).unwrap().parent(), Some(&NodeId::from("r")));
        assert_eq!(tree.owner(&a), None);

        let destroyed = tree.drain_latent();
        assert_eq!(destroyed.len(), 1);
        assert!(!tree.contains(&a));
        assert!(tree.drain_latent().is_empty());
    }

    #[test]
    fn reattaching_moves_ownership() {
        let mut tree = tree_with(&["r", "a", "b", "c"]);
        tree.set_root(&"r".into());
        tree.set_children(&"r".into(), ids(&["a", "b"]));
        tree.set_children(&"a".into(), ids(&["c"]));

        // c moves from a to b without passing through the latent pool
        tree.set_children(&"b".into(), ids(&["c"]));
        assert!(tree.children(&"a".into()).is_empty());
        assert_eq!(tree.owner(&"c".into()), Some(&NodeId::from("b")));
        assert!(tree.drain_latent().is_empty());
    }

    #[test]
    fn drops_duplicates_unknowns_and_cycles() {
        let mut tree = tree_with(&["r", "a", "b"]);
        tree.set_root(&"r".into());
        tree.set_children(&"r".into(), ids(&["a", "a", "ghost"]));
        assert_eq!(tree.children(&"r".into()), ids(&["a"]).as_slice());

        tree.set_children(&"a".into(), ids(&["b"]));
        assert!(!tree.set_children(&"b".into(), ids(&["r", "b"])));
        assert!(tree.children(&"b".into()).is_empty());
    }

    #[test]
    fn dirty_marking_stops_at_dirty_ancestor() {
        let mut tree = tree_with(&["r", "a", "b"]);
        tree.set_root(&"r".into());
        tree.set_children(&"r".into(), ids(&["a"]));
        tree.set_children(&"a".into(), ids(&["b"]));
        clean(&mut tree);

        tree.mark_dirty(&"b".into());
        assert!(tree.node(&"a".into()).unwrap().is_dirty());
        assert!(tree.node(&"r".into()).unwrap().is_dirty());

        clean(&mut tree);
        tree.node_mut(&"a".into()).unwrap().layout.dirty = true;
        tree.mark_dirty(&"b".into());
        assert!(!tree.node(&"r".into()).unwrap().is_dirty(), "walk should stop at a");
    }

    #[test]
    fn replacing_the_root_makes_the_old_one_latent() {
        let mut tree = tree_with(&["r", "s"]);
        tree.set_root(&"r".into());
        assert!(tree.set_root(&"s".into()));
        assert!(tree.is_latent(&"r".into()));
        assert_eq!(tree.root(), Some(&NodeId::from("s")));
        assert!(!tree.set_root(&"ghost".into()));
    }
}
