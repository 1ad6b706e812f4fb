//! The reconciler: turns batches of partial, id-keyed updates into the live tree.

use crate::batch::{Batch, BatchReport};
use crate::component::{Component, ComponentFactory};
use crate::components::decorator;
use crate::config::Config;
use crate::debug::DebugTable;
use crate::decorate::{self, Expansion};
use crate::error::{BatchError, FactoryError};
use crate::focus::FocusTracker;
use crate::hooks::{Hooks, LifecycleHook};
use crate::id::{DecoratorKind, NodeId};
use crate::layout::{LayoutEngine, LayoutStats};
use crate::node::Node;
use crate::rect::Rect;
use crate::registry::ChildAttributes;
use crate::state::{self, LayoutProps, State, INTERNAL_KEY, TYPE_KEY};
use crate::tree::Tree;
use cgmath::Vector2;
use std::collections::HashSet;
use tracing::{debug, info_span, warn};

/// A component built for a batch entry, not yet in the tree.
struct Staged {
    id: NodeId,
    type_tag: String,
    state: State,
    component: Box<dyn Component>,
    /// Whether an existing node of another type is being rebuilt.
    replaces: bool,
}

/// A live UI tree, kept up to date by applying batches from the backend.
///
/// All mutation goes through [`NodeTree::apply_batch`], [`NodeTree::focus`] and
/// [`NodeTree::set_viewport`]; everything else is read-only.
pub struct NodeTree {
    tree: Tree,
    factory: Box<dyn ComponentFactory>,
    attrs: ChildAttributes,
    layout: LayoutEngine,
    focus: FocusTracker,
    hooks: Hooks,
    debug: DebugTable,
}

impl NodeTree {
    /// Creates an empty tree.
    pub fn new<F: ComponentFactory + 'static>(config: Config, factory: F) -> NodeTree {
        NodeTree {
            tree: Tree::new(),
            factory: Box::new(factory),
            layout: LayoutEngine::new(config.viewport()),
            attrs: config.child_attributes,
            focus: FocusTracker::default(),
            hooks: Hooks::default(),
            debug: DebugTable::default(),
        }
    }

    /// Applies a batch, then lays out the tree.
    ///
    /// If this returns an error, the tree has not been modified.
    pub fn apply_batch(&mut self, batch: Batch) -> Result<BatchReport, BatchError> {
        let span = info_span!("batch", updates = batch.updates.len());
        let _guard = span.enter();

        let Expansion { updates, root } =
            decorate::expand(&self.tree, &self.attrs, batch.updates, batch.new_root);
        let mut report = BatchReport::default();

        // Stage every creation first so that a failure leaves the tree untouched.
        let mut staged = Vec::new();
        let mut entries = Vec::with_capacity(updates.len());
        for (id, partial) in updates {
            if let Some(value) = partial.get(TYPE_KEY).filter(|value| !value.is_string()) {
                return Err(BatchError::UnknownType {
                    type_tag: value.to_string(),
                    id,
                });
            }
            let existing = self.tree.node(&id);
            match (existing, state::type_tag(&partial)) {
                (None, None) => {
                    warn!(node = %id, "skipping update for nonexistent node");
                    report.stale.push(id);
                    continue;
                }
                (None, Some(type_tag)) => {
                    let state = state::merged(None, &partial);
                    staged.push(Staged {
                        component: self.create(&id, type_tag, &state)?,
                        type_tag: type_tag.to_string(),
                        id: id.clone(),
                        state,
                        replaces: false,
                    });
                }
                (Some(node), Some(type_tag)) if node.type_tag() != type_tag => {
                    let state = state::merged(Some(node.state()), &partial);
                    staged.push(Staged {
                        component: self.create(&id, type_tag, &state)?,
                        type_tag: type_tag.to_string(),
                        id: id.clone(),
                        state,
                        replaces: true,
                    });
                }
                _ => (),
            }
            entries.push((id, partial));
        }

        let mut fresh = HashSet::new();
        let mut retired = Vec::new();
        for staged in staged {
            if staged.replaces {
                report.replaced.push(staged.id.clone());
                retired.extend(self.replace(staged));
                continue;
            }
            let id = staged.id.clone();
            self.debug.update(&id, &staged.state);
            self.tree.insert(Node::new(
                staged.id,
                staged.type_tag,
                staged.state,
                staged.component,
            ));
            if let Some(node) = self.tree.node_mut(&id) {
                node.component.did_appear();
            }
            if let Some(node) = self.tree.node(&id) {
                self.hooks.created(node);
            }
            debug!(node = %id, "created node");
            report.created.push(id.clone());
            fresh.insert(id);
        }

        for (id, partial) in &entries {
            if !fresh.contains(id) {
                self.apply_state(id, partial);
            }
        }

        let focused = self.focus.focused().cloned();

        for (id, partial) in &entries {
            self.reconcile_children(id, partial);
        }

        if let Some(root) = root {
            if self.tree.set_root(&root) {
                debug!(node = %root, "replaced root");
            }
        }

        report.focus = self.focus.restore(&mut self.tree);
        if let Some(focused) = focused {
            if !self.tree.is_live(&focused) {
                debug!(node = %focused, focus = ?report.focus, "focused node was detached");
            }
        }

        for mut node in retired.into_iter().chain(self.tree.drain_latent()) {
            node.component.will_disappear();
            self.hooks.destroyed(&node);
            if !self.tree.contains(&node.id) {
                self.debug.remove(&node.id);
            }
            debug!(node = %node.id, "destroyed node");
            report.destroyed.push(node.id);
        }

        if self.tree.root().is_none() && !self.tree.is_empty() {
            warn!("tree has nodes but no root");
        }

        self.layout.run(&mut self.tree);
        Ok(report)
    }

    fn create(
        &self,
        id: &NodeId,
        type_tag: &str,
        state: &State,
    ) -> Result<Box<dyn Component>, BatchError> {
        if let Some((_, kind)) = id.decorator_host() {
            return Ok(decorator::build(kind, state));
        }
        if DecoratorKind::from_type_tag(type_tag).is_some() {
            return Err(BatchError::UnknownType {
                id: id.clone(),
                type_tag: type_tag.to_string(),
            });
        }
        self.factory
            .create(type_tag, state)
            .map_err(|err| match err {
                FactoryError::UnknownType(type_tag) => BatchError::UnknownType {
                    id: id.clone(),
                    type_tag,
                },
                source => BatchError::Factory {
                    id: id.clone(),
                    source,
                },
            })
    }

    /// Rebuilds a node whose type changed, keeping its place in the tree.
    ///
    /// Returns the old instance, to be torn down with the rest of the batch's garbage.
    fn replace(&mut self, staged: Staged) -> Option<Node> {
        let node = self.tree.node_mut(&staged.id)?;
        debug!(node = %staged.id, from = %node.type_tag, to = %staged.type_tag, "replacing node");
        let old = node.rebuild(staged.type_tag, staged.component);
        node.component.did_appear();
        self.hooks.created(node);
        self.tree.mark_dirty(&staged.id);
        Some(old)
    }

    /// Merges a partial state into an existing node and marks it dirty if its size may change.
    fn apply_state(&mut self, id: &NodeId, partial: &State) {
        let node = match self.tree.node_mut(id) {
            Some(node) => node,
            None => return,
        };
        let changed = state::merge(&mut node.state, partial);
        if changed.is_empty() {
            return;
        }

        let props = LayoutProps::from_state(&node.state);
        let mut dirty = props.size != node.props.size || props.grow != node.props.grow;
        node.props = props;

        let child_attrs = self.attrs.for_type(&node.type_tag);
        let affects_component = changed
            .iter()
            .any(|key| key != INTERNAL_KEY && key != TYPE_KEY && !child_attrs.contains(key));
        if affects_component {
            dirty |= node.component.update(&node.state);
        }

        if changed.iter().any(|key| key == INTERNAL_KEY) {
            self.debug.update(id, &node.state);
        }
        if dirty {
            self.tree.mark_dirty(id);
        }
    }

    /// Brings a node’s children in line with its child properties, if the entry touched them.
    fn reconcile_children(&mut self, id: &NodeId, partial: &State) {
        let node = match self.tree.node(id) {
            Some(node) => node,
            None => return,
        };
        let child_attrs = self.attrs.for_type(node.type_tag());
        if !child_attrs.iter().any(|attr| partial.contains_key(attr)) {
            return;
        }
        let children = state::child_refs(node.state(), child_attrs);
        self.tree.set_children(id, children);
    }

    /// Moves keyboard focus to a node.
    ///
    /// Returns false if the node is not live or can’t take focus right now.
    pub fn focus(&mut self, id: &NodeId) -> bool {
        self.focus.request(&mut self.tree, id)
    }

    pub fn focused(&self) -> Option<&NodeId> {
        self.focus.focused()
    }

    /// Resizes the root and lays out again.
    pub fn set_viewport(&mut self, viewport: Vector2<f64>) {
        self.layout.set_viewport(viewport);
        self.layout.run(&mut self.tree);
    }

    pub fn viewport(&self) -> Vector2<f64> {
        self.layout.viewport()
    }

    /// Registers a callback run after every node is created.
    pub fn on_node_created<F: 'static + FnMut(&Node) + Send>(&mut self, hook: F) {
        self.hooks.on_created(LifecycleHook::new(hook));
    }

    /// Registers a callback run once for every destroyed node.
    pub fn on_node_destroyed<F: 'static + FnMut(&Node) + Send>(&mut self, hook: F) {
        self.hooks.on_destroyed(LifecycleHook::new(hook));
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.tree.node(id)
    }

    pub fn root(&self) -> Option<&NodeId> {
        self.tree.root()
    }

    pub fn children(&self, id: &NodeId) -> &[NodeId] {
        self.tree.children(id)
    }

    /// The rectangle a live node occupies, in root coordinates.
    pub fn frame(&self, id: &NodeId) -> Option<Rect> {
        self.tree.frame(id)
    }

    pub fn debug(&self) -> &DebugTable {
        &self.debug
    }

    /// Counters from the most recent layout run.
    pub fn layout_stats(&self) -> &LayoutStats {
        self.layout.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use serde_json::{json, Value};

    fn batch(value: Value) -> Batch {
        serde_json::from_value(value).unwrap()
    }

    fn node_tree() -> NodeTree {
        NodeTree::new(Config::default(), Registry::with_builtins())
    }

    #[test]
    fn builds_scenario_tree() {
        let mut tree = node_tree();
        let report = tree
            .apply_batch(batch(json!({
                "updates": {
                    "5": { "type": "Column", "children": [6, 7] },
                    "6": { "type": "Text", "text": "a" },
                    "7": { "type": "Text", "text": "b", "margin": [1, 0, 0, 0] },
                },
                "newRootId": 5,
            })))
            .unwrap();

        let mut created = report.created.clone();
        created.sort();
        assert_eq!(created, vec![NodeId::from("5"), "6".into(), "7".into(), "7:margin".into()]);
        assert_eq!(tree.children(&"5".into()), [NodeId::from("6"), "7:margin".into()]);
        assert_eq!(tree.children(&"7:margin".into()), [NodeId::from("7")]);
        assert!(tree.node(&"7:margin".into()).unwrap().is_decorator());
        assert!(report.destroyed.is_empty());
    }

    #[test]
    fn type_change_rebuilds_in_place() {
        let mut tree = node_tree();
        tree.apply_batch(batch(json!({
            "updates": {
                "1": { "type": "Row", "children": [2] },
                "2": { "type": "Text", "text": "x" },
            },
            "newRootId": 1,
        })))
        .unwrap();
        let before = tree.node(&"2".into()).unwrap().instance();

        let report = tree
            .apply_batch(batch(json!({ "updates": { "2": { "type": "Button", "label": "x" } } })))
            .unwrap();
        assert_eq!(report.replaced, vec![NodeId::from("2")]);
        let node = tree.node(&"2".into()).unwrap();
        assert_ne!(node.instance(), before);
        assert_eq!(node.type_tag(), "Button");
        assert_eq!(tree.children(&"1".into()), [NodeId::from("2")]);
    }

    #[test]
    fn backend_decorator_tags_are_unknown() {
        let mut tree = node_tree();
        let err = tree
            .apply_batch(batch(json!({ "updates": { "1": { "type": "$margin" } } })))
            .unwrap_err();
        assert!(matches!(err, BatchError::UnknownType { .. }));
    }

    #[test]
    fn internal_flag_goes_to_debug_table() {
        let mut tree = node_tree();
        tree.apply_batch(batch(json!({
            "updates": { "1": { "type": "Stack", "internal": true } },
            "newRootId": 1,
        })))
        .unwrap();
        assert!(tree.debug().is_internal(&"1".into()));

        tree.apply_batch(batch(json!({ "updates": { "1": { "internal": false } } })))
            .unwrap();
        assert!(!tree.debug().is_internal(&"1".into()));
    }
}
