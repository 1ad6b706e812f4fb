//! The node record shared by every tree member.

use crate::component::Component;
use crate::id::{InstanceId, NodeId};
use crate::rect::Axis;
use crate::state::{LayoutProps, State};
use cgmath::{Vector2, Zero};
use std::mem;

/// Cached layout results and the dirty flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutState {
    pub dirty: bool,
    pub natural: Vector2<f64>,
    /// `max(natural, explicit override)`.
    pub requested: Vector2<f64>,
    pub allocated: Vector2<f64>,
    /// Position relative to the parent.
    pub offset: Vector2<f64>,
}

impl Default for LayoutState {
    fn default() -> LayoutState {
        LayoutState {
            dirty: true,
            natural: Vector2::zero(),
            requested: Vector2::zero(),
            allocated: Vector2::zero(),
            offset: Vector2::zero(),
        }
    }
}

/// A tree member, real or synthetic.
#[derive(Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) instance: InstanceId,
    pub(crate) type_tag: String,
    pub(crate) state: State,
    /// Parsed reserved properties of `state`.
    pub(crate) props: LayoutProps,
    pub(crate) component: Box<dyn Component>,
    /// Last known parent. Not cleared when the node is detached.
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) layout: LayoutState,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        type_tag: String,
        state: State,
        component: Box<dyn Component>,
    ) -> Node {
        Node {
            props: LayoutProps::from_state(&state),
            id,
            instance: InstanceId::new(),
            type_tag,
            state,
            component,
            parent: None,
            children: Vec::new(),
            layout: LayoutState::default(),
        }
    }

    /// Swaps in a component of another type under a new instance. Returns the old instance as a
    /// detached node.
    pub(crate) fn rebuild(&mut self, type_tag: String, component: Box<dyn Component>) -> Node {
        Node {
            id: self.id.clone(),
            instance: mem::replace(&mut self.instance, InstanceId::new()),
            type_tag: mem::replace(&mut self.type_tag, type_tag),
            state: self.state.clone(),
            props: self.props,
            component: mem::replace(&mut self.component, component),
            parent: self.parent.clone(),
            children: Vec::new(),
            layout: self.layout,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Identifies this instance; changes if the node is ever rebuilt.
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn props(&self) -> &LayoutProps {
        &self.props
    }

    pub fn component(&self) -> &dyn Component {
        &*self.component
    }

    /// Downcasts the component.
    pub fn component_as<T: Component>(&self) -> Option<&T> {
        self.component.as_any().downcast_ref::<T>()
    }

    /// The last known parent; may be stale for detached nodes.
    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// True for margin and alignment nodes.
    pub fn is_decorator(&self) -> bool {
        self.id.is_synthetic()
    }

    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    pub fn is_dirty(&self) -> bool {
        self.layout.dirty
    }

    pub fn natural(&self) -> Vector2<f64> {
        self.layout.natural
    }

    pub fn requested(&self) -> Vector2<f64> {
        self.layout.requested
    }

    pub fn allocated(&self) -> Vector2<f64> {
        self.layout.allocated
    }

    pub fn offset(&self) -> Vector2<f64> {
        self.layout.offset
    }

    pub(crate) fn accepts_focus(&self) -> bool {
        self.component
            .focusable()
            .map_or(false, |focus| focus.can_accept_focus())
    }

    pub(crate) fn explicit_size(&self, axis: Axis) -> Option<f64> {
        self.props.size(axis)
    }
}
