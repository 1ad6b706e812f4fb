//! Component behavior: the type-specific half of a node.
//!
//! The core never looks at type tags. Everything it needs to know about a node’s type goes
//! through the [`Component`] trait, which a [`ComponentFactory`] produces from a type tag and an
//! initial state.

use crate::error::FactoryError;
use crate::rect::Axis;
use crate::state::State;
use core::any::Any;
use core::fmt;

/// What a parent knows about one of its children along an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildSize {
    /// The child’s natural size.
    pub natural: f64,
    /// The child’s requested size; at least `natural`.
    pub requested: f64,
    /// Whether the child wants leftover space.
    pub grow: bool,
}

/// Context for measuring a node’s natural size.
#[derive(Debug)]
pub struct MeasureCx<'a> {
    pub axis: Axis,
    /// Children in order, already measured on this axis.
    pub children: &'a [ChildSize],
    /// When measuring height: the width this node was allocated.
    pub allocated_width: Option<f64>,
}

impl<'a> MeasureCx<'a> {
    /// The largest requested child size, or zero.
    pub fn max_child(&self) -> f64 {
        self.children.iter().map(|c| c.requested).fold(0., f64::max)
    }

    /// The sum of all requested child sizes.
    pub fn sum_children(&self) -> f64 {
        self.children.iter().map(|c| c.requested).sum()
    }
}

/// Context for allocating space to a node’s children.
#[derive(Debug)]
pub struct AllocateCx<'a> {
    pub axis: Axis,
    /// The size this node was allocated along the axis.
    pub size: f64,
    pub children: &'a [ChildSize],
    pub(crate) allocations: Vec<f64>,
    pub(crate) offsets: Vec<f64>,
}

impl<'a> AllocateCx<'a> {
    pub(crate) fn new(axis: Axis, size: f64, children: &'a [ChildSize]) -> AllocateCx<'a> {
        AllocateCx {
            axis,
            size,
            children,
            // unassigned children keep whatever they requested
            allocations: children.iter().map(|c| c.requested).collect(),
            offsets: vec![0.; children.len()],
        }
    }

    /// Assigns a child its size and position along the axis, relative to this node.
    pub fn set(&mut self, index: usize, size: f64, offset: f64) {
        self.allocations[index] = size;
        self.offsets[index] = offset;
    }

    pub fn allocation(&self, index: usize) -> f64 {
        self.allocations[index]
    }

    /// The largest requested child size, or zero.
    pub fn max_child(&self) -> f64 {
        self.children.iter().map(|c| c.requested).fold(0., f64::max)
    }
}

/// Result of an allocation callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocate {
    Done,
    /// The callback changed an assumption it made earlier in the pass (e.g. whether a scrollbar
    /// is shown) and wants its subtree laid out once more.
    ///
    /// Honored at most once per node per layout run; the allocation assigned alongside a second
    /// request is accepted as is.
    Relayout,
}

/// The optional keyboard focus capability.
pub trait Focusable {
    /// Whether focus may be granted right now (e.g. false for disabled controls).
    fn can_accept_focus(&self) -> bool {
        true
    }

    /// Called when the node receives keyboard focus.
    fn grab_focus(&mut self);

    /// Called when the node loses keyboard focus.
    fn release_focus(&mut self) {}
}

/// Type-specific node behavior.
///
/// Measurement must be a pure function of the component and the context, since cached sizes are
/// reused for clean subtrees.
pub trait Component: Any + fmt::Debug {
    /// Computes the natural size along `cx.axis`.
    ///
    /// The default is a pass-through container sized to its largest child.
    fn measure(&self, cx: &MeasureCx) -> f64 {
        cx.max_child()
    }

    /// Allocates space to children along `cx.axis`.
    ///
    /// The default gives every child the node’s full size, at offset zero.
    fn allocate(&mut self, cx: &mut AllocateCx) -> Allocate {
        for i in 0..cx.children.len() {
            let size = cx.size.max(cx.children[i].requested);
            cx.set(i, size, 0.);
        }
        Allocate::Done
    }

    /// Applies a changed state.
    ///
    /// Returns true if the change can affect this node’s measurement.
    fn update(&mut self, state: &State) -> bool {
        let _ = state;
        true
    }

    /// Called after the node has been registered in the tree.
    fn did_appear(&mut self) {}

    /// Called right before the node is destroyed.
    fn will_disappear(&mut self) {}

    fn focusable(&self) -> Option<&dyn Focusable> {
        None
    }

    fn focusable_mut(&mut self) -> Option<&mut dyn Focusable> {
        None
    }

    /// For downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Creates components from backend-declared type tags.
pub trait ComponentFactory {
    fn create(&self, type_tag: &str, state: &State) -> Result<Box<dyn Component>, FactoryError>;
}
