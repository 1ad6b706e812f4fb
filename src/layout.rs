//! The layout engine.
//!
//! Layout runs in four phases over the dirty part of the tree: measure widths (bottom-up),
//! allocate widths (top-down), then the same for heights, since a node’s height may depend on
//! the width it was given. Clean subtrees keep their cached sizes and are not visited.

use crate::component::{Allocate, AllocateCx, ChildSize, MeasureCx};
use crate::id::NodeId;
use crate::rect::Axis;
use crate::tree::Tree;
use cgmath::{Vector2, Zero};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, trace, warn};

/// Counters for one layout run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutStats {
    /// Measure callbacks per node, both axes combined.
    pub measured: BTreeMap<NodeId, usize>,
    /// Allocate callbacks per node, both axes combined.
    pub allocated: BTreeMap<NodeId, usize>,
    /// Honored re-pass requests.
    pub relayouts: usize,
    /// Re-pass requests that were refused because the node already had one.
    pub oscillations: usize,
}

impl LayoutStats {
    /// Every node that had a callback invoked.
    pub fn visited(&self) -> BTreeSet<NodeId> {
        self.measured
            .keys()
            .chain(self.allocated.keys())
            .cloned()
            .collect()
    }

    pub fn measure_count(&self, id: &NodeId) -> usize {
        self.measured.get(id).copied().unwrap_or(0)
    }

    pub fn allocate_count(&self, id: &NodeId) -> usize {
        self.allocated.get(id).copied().unwrap_or(0)
    }
}

#[derive(Debug)]
pub(crate) struct LayoutEngine {
    viewport: Vector2<f64>,
    stats: LayoutStats,
    /// Nodes that already had their re-pass this run.
    repassed: HashSet<NodeId>,
}

impl LayoutEngine {
    pub fn new(viewport: Vector2<f64>) -> LayoutEngine {
        LayoutEngine {
            viewport,
            stats: LayoutStats::default(),
            repassed: HashSet::new(),
        }
    }

    pub fn viewport(&self) -> Vector2<f64> {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Vector2<f64>) {
        self.viewport = viewport;
    }

    /// Stats of the most recent run.
    pub fn stats(&self) -> &LayoutStats {
        &self.stats
    }

    /// Lays out the dirty part of the tree.
    pub fn run(&mut self, tree: &mut Tree) {
        self.stats = LayoutStats::default();
        self.repassed.clear();

        let root = match tree.root() {
            Some(root) => root.clone(),
            None => return,
        };
        match tree.node_mut(&root) {
            Some(node) => {
                if node.layout.allocated != self.viewport {
                    node.layout.allocated = self.viewport;
                    node.layout.dirty = true;
                }
                node.layout.offset = Vector2::zero();
                if !node.layout.dirty {
                    return;
                }
            }
            None => return,
        }

        trace!(root = %root, "running layout");
        for axis in Axis::BOTH {
            self.measure(tree, &root, axis);
            self.allocate(tree, &root, axis);
        }
    }

    fn child_sizes(tree: &Tree, children: &[NodeId], axis: Axis) -> Vec<ChildSize> {
        children
            .iter()
            .filter_map(|id| tree.node(id))
            .map(|child| ChildSize {
                natural: child.layout.natural[axis.index()],
                requested: child.layout.requested[axis.index()],
                grow: child.props.grows(axis),
            })
            .collect()
    }

    fn measure(&mut self, tree: &mut Tree, id: &NodeId, axis: Axis) {
        let children = match tree.node(id) {
            Some(node) if node.layout.dirty => node.children.clone(),
            _ => return,
        };
        for child in &children {
            self.measure(tree, child, axis);
        }

        let sizes = Self::child_sizes(tree, &children, axis);
        let node = match tree.node_mut(id) {
            Some(node) => node,
            None => return,
        };
        let cx = MeasureCx {
            axis,
            children: &sizes,
            allocated_width: match axis {
                Axis::X => None,
                Axis::Y => Some(node.layout.allocated.x),
            },
        };
        let natural = node.component.measure(&cx).max(0.);
        let requested = node
            .explicit_size(axis)
            .map_or(natural, |size| size.max(natural));
        node.layout.natural[axis.index()] = natural;
        node.layout.requested[axis.index()] = requested;

        *self.stats.measured.entry(id.clone()).or_insert(0) += 1;
        trace!(node = %id, ?axis, natural, requested, "measured");
    }

    fn allocate(&mut self, tree: &mut Tree, id: &NodeId, axis: Axis) {
        let children = match tree.node(id) {
            Some(node) if node.layout.dirty => node.children.clone(),
            _ => return,
        };

        loop {
            let sizes = Self::child_sizes(tree, &children, axis);
            let node = match tree.node_mut(id) {
                Some(node) => node,
                None => return,
            };
            let mut cx = AllocateCx::new(axis, node.layout.allocated[axis.index()], &sizes);
            let result = node.component.allocate(&mut cx);
            let AllocateCx {
                allocations,
                offsets,
                ..
            } = cx;
            *self.stats.allocated.entry(id.clone()).or_insert(0) += 1;

            if result == Allocate::Relayout {
                if self.repassed.insert(id.clone()) {
                    debug!(node = %id, ?axis, "re-laying out subtree");
                    self.stats.relayouts += 1;
                    if axis == Axis::Y {
                        self.repass(tree, id);
                    }
                    continue;
                }
                warn!(node = %id, ?axis, "node asked for a second re-layout; keeping current allocation");
                self.stats.oscillations += 1;
            }

            Self::assign(tree, &children, axis, &allocations, &offsets);
            trace!(node = %id, ?axis, "allocated");
            break;
        }

        for child in &children {
            self.allocate(tree, child, axis);
        }

        if axis == Axis::Y {
            if let Some(node) = tree.node_mut(id) {
                node.layout.dirty = false;
            }
        }
    }

    /// Re-lays out a node’s subtree after its height allocation changed an assumption made
    /// while allocating widths.
    fn repass(&mut self, tree: &mut Tree, id: &NodeId) {
        self.allocate(tree, id, Axis::X);
        self.measure(tree, id, Axis::Y);
    }

    /// Applies allocations to children, marking those whose size changed dirty.
    fn assign(
        tree: &mut Tree,
        children: &[NodeId],
        axis: Axis,
        allocations: &[f64],
        offsets: &[f64],
    ) {
        let i = axis.index();
        for ((child, &size), &offset) in children.iter().zip(allocations).zip(offsets) {
            if let Some(node) = tree.node_mut(child) {
                if node.layout.allocated[i] != size {
                    node.layout.allocated[i] = size;
                    node.layout.dirty = true;
                }
                node.layout.offset[i] = offset;
            }
        }
    }
}
