//! Margin and alignment nodes.
//!
//! The reconciler wraps nodes in these when their reserved `margin`/`align` properties ask for
//! it. They are never created by a [`ComponentFactory`](crate::ComponentFactory).

use crate::component::{Allocate, AllocateCx, Component, MeasureCx};
use crate::id::{DecoratorKind, NodeId};
use crate::registry::DECORATOR_CHILD;
use crate::state::{AxisAlign, Insets, LayoutProps, State, GROW_KEY, TYPE_KEY};
use core::any::Any;
use serde_json::Value;

const INSETS_KEY: &str = "insets";
const ALIGNMENT_KEY: &str = "alignment";

/// Builds the state of a host’s decorator.
///
/// Decorators carry the host’s grow flags so that containers grow the decorated box.
pub(crate) fn decorator_state(kind: DecoratorKind, host: &LayoutProps, child: &NodeId) -> State {
    let mut state = State::new();
    state.insert(TYPE_KEY.into(), kind.type_tag().into());
    state.insert(DECORATOR_CHILD.into(), child.clone().into());
    state.insert(GROW_KEY.into(), host.grow_value());
    match kind {
        DecoratorKind::Margin => state.insert(INSETS_KEY.into(), host.margin.to_value()),
        DecoratorKind::Align => state.insert(ALIGNMENT_KEY.into(), host.align_value()),
    };
    state
}

pub(crate) fn build(kind: DecoratorKind, state: &State) -> Box<dyn Component> {
    match kind {
        DecoratorKind::Margin => {
            let mut margin = Margin {
                insets: Insets::default(),
            };
            margin.update(state);
            Box::new(margin)
        }
        DecoratorKind::Align => {
            let mut align = Align { align: [None; 2] };
            align.update(state);
            Box::new(align)
        }
    }
}

/// Insets its child by fixed amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct Margin {
    insets: Insets,
}

impl Margin {
    pub fn insets(&self) -> Insets {
        self.insets
    }
}

impl Component for Margin {
    fn measure(&self, cx: &MeasureCx) -> f64 {
        cx.max_child() + self.insets.total(cx.axis)
    }

    fn allocate(&mut self, cx: &mut AllocateCx) -> Allocate {
        let size = (cx.size - self.insets.total(cx.axis)).max(0.);
        let offset = self.insets.leading(cx.axis);
        for i in 0..cx.children.len() {
            cx.set(i, size, offset);
        }
        Allocate::Done
    }

    fn update(&mut self, state: &State) -> bool {
        let insets = state
            .get(INSETS_KEY)
            .and_then(Insets::parse)
            .unwrap_or_default();
        let changed = insets != self.insets;
        self.insets = insets;
        changed
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Positions its child within the space it is given.
///
/// On a `fill` (or unset) axis the child gets the full size. Otherwise the child keeps its
/// requested size and is offset by `fraction × leftover`.
#[derive(Debug, Clone, PartialEq)]
pub struct Align {
    align: [Option<AxisAlign>; 2],
}

impl Align {
    pub fn alignment(&self) -> [Option<AxisAlign>; 2] {
        self.align
    }
}

impl Component for Align {
    fn allocate(&mut self, cx: &mut AllocateCx) -> Allocate {
        for i in 0..cx.children.len() {
            let requested = cx.children[i].requested;
            match self.align[cx.axis.index()] {
                None | Some(AxisAlign::Fill) => cx.set(i, cx.size, 0.),
                Some(AxisAlign::Fraction(fraction)) => {
                    let offset = fraction * (cx.size - requested).max(0.);
                    cx.set(i, requested, offset);
                }
            }
        }
        Allocate::Done
    }

    fn update(&mut self, state: &State) -> bool {
        let align = match state.get(ALIGNMENT_KEY) {
            Some(Value::Array(items)) if items.len() == 2 => [
                AxisAlign::parse(&items[0]).flatten(),
                AxisAlign::parse(&items[1]).flatten(),
            ],
            _ => [None; 2],
        };
        let changed = align != self.align;
        self.align = align;
        changed
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
