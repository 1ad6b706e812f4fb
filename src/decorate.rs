//! Decorator synthesis: expands a batch so that every node with a margin or alignment is wrapped
//! in the corresponding decorator nodes, and every child reference points at the outermost one.

use crate::components::decorator::decorator_state;
use crate::id::{DecoratorKind, NodeId};
use crate::registry::ChildAttributes;
use crate::state::{self, LayoutProps, State};
use crate::tree::Tree;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// A batch after decorator synthesis.
#[derive(Debug, Default)]
pub(crate) struct Expansion {
    pub updates: BTreeMap<NodeId, State>,
    /// The node the root slot should point at after the batch, if it changes.
    pub root: Option<NodeId>,
}

/// The outermost id of a node’s decorator chain.
fn outermost(id: &NodeId, props: &LayoutProps) -> NodeId {
    if props.needs_align() {
        id.decorator(DecoratorKind::Align)
    } else if props.needs_margin() {
        id.decorator(DecoratorKind::Margin)
    } else {
        id.clone()
    }
}

/// The type a batch entry will have once applied.
fn entry_type<'a>(tree: &'a Tree, id: &NodeId, partial: &'a State) -> Option<&'a str> {
    state::type_tag(partial).or_else(|| tree.node(id).map(|node| node.type_tag()))
}

/// Expands a batch. Does not touch the tree.
pub(crate) fn expand(
    tree: &Tree,
    attrs: &ChildAttributes,
    mut updates: BTreeMap<NodeId, State>,
    new_root: Option<NodeId>,
) -> Expansion {
    updates.retain(|id, _| {
        if id.is_synthetic() {
            warn!(node = %id, "ignoring backend update for a decorator id");
        }
        !id.is_synthetic()
    });

    // Entries for nodes that don't exist and aren't being created are skipped later; they
    // get no decorators either.
    let effective: HashMap<NodeId, LayoutProps> = updates
        .iter()
        .filter(|(id, partial)| tree.contains(id) || partial.contains_key(state::TYPE_KEY))
        .map(|(id, partial)| {
            let stored = tree.node(id).map(|node| node.state());
            (id.clone(), LayoutProps::from_state(&state::merged(stored, partial)))
        })
        .collect();
    let props_of = |id: &NodeId| -> LayoutProps {
        match effective.get(id) {
            Some(props) => *props,
            None => tree.node(id).map(|node| *node.props()).unwrap_or_default(),
        }
    };

    let mut decorators = BTreeMap::new();
    let mut repaired: BTreeMap<NodeId, State> = BTreeMap::new();
    let mut root = None;

    for (id, props) in &effective {
        let mut inner = id.clone();
        if props.needs_margin() {
            let margin = id.decorator(DecoratorKind::Margin);
            decorators.insert(
                margin.clone(),
                decorator_state(DecoratorKind::Margin, props, &inner),
            );
            inner = margin;
        }
        if props.needs_align() {
            let align = id.decorator(DecoratorKind::Align);
            decorators.insert(
                align.clone(),
                decorator_state(DecoratorKind::Align, props, &inner),
            );
            inner = align;
        }

        let old = match tree.node(id) {
            Some(node) => outermost(id, node.props()),
            None => continue,
        };
        if old == inner || !tree.contains(&old) {
            continue;
        }
        debug!(node = %id, from = %old, to = %inner, "decorator chain changed");

        // find the real node holding the chain
        let mut owner = tree.owner(&old);
        while let Some(parent) = owner {
            if parent.is_synthetic() && parent.base() == *id {
                owner = tree.owner(parent);
            } else {
                break;
            }
        }

        match owner {
            Some(parent) => {
                let parent_node = match tree.node(parent) {
                    Some(node) => node,
                    None => continue,
                };
                let partial = updates
                    .get(parent)
                    .or_else(|| repaired.get(parent))
                    .cloned()
                    .unwrap_or_default();
                let mut partial = partial;
                for attr in attrs.for_type(parent_node.type_tag()) {
                    if !partial.contains_key(attr) {
                        if let Some(value) = parent_node.state().get(attr) {
                            partial.insert(attr.clone(), value.clone());
                        }
                    }
                }
                repaired.insert(parent.clone(), partial);
            }
            None if tree.root() == Some(&old) => root = Some(inner),
            None => (),
        }
    }

    for (id, partial) in repaired {
        updates.insert(id, partial);
    }

    let ids: Vec<NodeId> = updates.keys().cloned().collect();
    for id in ids {
        let child_attrs = match updates.get(&id).and_then(|partial| entry_type(tree, &id, partial)) {
            Some(type_tag) => attrs.for_type(type_tag).to_vec(),
            None => continue,
        };
        if let Some(partial) = updates.get_mut(&id) {
            state::rewrite_child_refs(partial, &child_attrs, |child| {
                let base = child.base();
                outermost(&base, &props_of(&base))
            });
        }
    }

    updates.extend(decorators);

    if let Some(new_root) = new_root {
        let base = new_root.base();
        root = Some(outermost(&base, &props_of(&base)));
    }

    Expansion { updates, root }
}
