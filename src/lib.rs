//! Client runtime for remote UIs.
//!
//! # Conceptual overview
//! A backend owns the UI and periodically sends the client sparse, partial descriptions of a
//! component tree. Roost rebuilds a live tree from these and computes where everything goes on
//! screen; painting is left to whoever reads the tree afterwards.
//!
//! ## Batches
//! Updates arrive in batches: a map from node ids to partial states, plus an optional new root.
//! A partial state is merged shallowly into the stored one, with `null` removing a key. Nodes are
//! created the first time their id shows up with a `type`, and keep their instance for as long as
//! they stay in the tree, even if they move to another parent within one batch. Nodes that are no
//! longer referenced by the end of a batch are destroyed.
//!
//! A batch either applies completely or not at all: every component is created before the tree is
//! touched, so an unknown type leaves the tree as it was.
//!
//! ## Decorators
//! Margins and alignment are not the business of components. When a node asks for either through
//! its reserved `margin` and `align` properties, the reconciler wraps it in margin and alignment
//! nodes (alignment outermost) and points the parent at the outermost one. Their ids are derived
//! from the host id, e.g. `7:margin`.
//!
//! ## Layout
//! Layout is performed in four phases: natural widths are measured bottom-up, then widths are
//! allocated top-down, and then the same for heights, since the height of e.g. wrapped text
//! depends on the width it was given. Only dirty nodes are visited. Marking a node dirty marks its
//! ancestors too; a node whose allocation changes is marked dirty by its parent.
//!
//! An allocation callback may find out that an assumption it made while allocating widths was
//! wrong (a scroll view that needs a scrollbar after all) and ask for its subtree to be laid out
//! once more.
//!
//! ## Coordinate System
//! The origin is at the top left corner of the viewport, and positive y points down. Offsets are
//! relative to the parent; use [`NodeTree::frame`] for root coordinates.

mod batch;
pub mod component;
pub mod components;
mod config;
mod debug;
mod decorate;
mod error;
mod focus;
mod hooks;
mod host;
mod id;
mod layout;
mod node;
mod reconciler;
mod rect;
mod registry;
pub mod state;
mod tree;

pub use batch::{Batch, BatchReport};
pub use component::{Allocate, Component, ComponentFactory, Focusable};
pub use config::Config;
pub use debug::DebugTable;
pub use error::{BatchError, ConfigError, FactoryError, HostError};
pub use focus::FocusChange;
pub use hooks::LifecycleHook;
pub use host::{BatchSender, Host};
pub use id::{DecoratorKind, InstanceId, NodeId};
pub use layout::LayoutStats;
pub use node::{LayoutState, Node};
pub use reconciler::NodeTree;
pub use rect::{Axis, Rect};
pub use registry::{ChildAttributes, Registry};
pub use state::State;
pub use tree::Tree;
