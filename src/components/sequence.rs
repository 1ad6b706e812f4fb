use crate::component::{Allocate, AllocateCx, Component, MeasureCx};
use crate::rect::Axis;
use crate::state::State;
use core::any::Any;
use serde_json::Value;

/// Lays children out one after the other along an axis (`Row` along x, `Column` along y).
///
/// Children get their requested size on the main axis; leftover space is split evenly among the
/// children that grow on that axis. On the cross axis every child fills the container.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    axis: Axis,
    spacing: f64,
}

impl Sequence {
    pub fn new(axis: Axis) -> Sequence {
        Sequence { axis, spacing: 0. }
    }

    pub fn from_state(axis: Axis, state: &State) -> Sequence {
        let mut sequence = Sequence::new(axis);
        sequence.update(state);
        sequence
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    fn total_spacing(&self, count: usize) -> f64 {
        self.spacing * count.saturating_sub(1) as f64
    }
}

impl Component for Sequence {
    fn measure(&self, cx: &MeasureCx) -> f64 {
        if cx.axis == self.axis {
            cx.sum_children() + self.total_spacing(cx.children.len())
        } else {
            cx.max_child()
        }
    }

    fn allocate(&mut self, cx: &mut AllocateCx) -> Allocate {
        if cx.axis != self.axis {
            for i in 0..cx.children.len() {
                let size = cx.size.max(cx.children[i].requested);
                cx.set(i, size, 0.);
            }
            return Allocate::Done;
        }

        let used = cx.children.iter().map(|c| c.requested).sum::<f64>()
            + self.total_spacing(cx.children.len());
        let growing = cx.children.iter().filter(|c| c.grow).count();
        let extra = if growing > 0 && cx.size > used {
            (cx.size - used) / growing as f64
        } else {
            0.
        };

        let mut cursor = 0.;
        for i in 0..cx.children.len() {
            let child = cx.children[i];
            let size = if child.grow {
                child.requested + extra
            } else {
                child.requested
            };
            cx.set(i, size, cursor);
            cursor += size + self.spacing;
        }
        Allocate::Done
    }

    fn update(&mut self, state: &State) -> bool {
        let spacing = state.get("spacing").and_then(Value::as_f64).unwrap_or(0.).max(0.);
        let changed = spacing != self.spacing;
        self.spacing = spacing;
        changed
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Overlays all children on top of each other, sized to the largest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stack;

impl Component for Stack {
    fn update(&mut self, _state: &State) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ChildSize;

    fn child(requested: f64, grow: bool) -> ChildSize {
        ChildSize {
            natural: requested,
            requested,
            grow,
        }
    }

    #[test]
    fn leftover_goes_to_growing_children() {
        let children = [child(2., false), child(3., true), child(1., true)];
        let mut row = Sequence::new(Axis::X);

        let cx = MeasureCx {
            axis: Axis::X,
            children: &children,
            allocated_width: None,
        };
        assert_eq!(row.measure(&cx), 6.);

        let mut cx = AllocateCx::new(Axis::X, 10., &children);
        row.allocate(&mut cx);
        assert_eq!(cx.allocations, vec![2., 5., 3.]);
        assert_eq!(cx.offsets, vec![0., 2., 7.]);
    }

    #[test]
    fn no_growing_children_leaves_space_unused() {
        let children = [child(2., false), child(3., false)];
        let mut row = Sequence::new(Axis::X);
        let mut cx = AllocateCx::new(Axis::X, 10., &children);
        row.allocate(&mut cx);
        assert_eq!(cx.allocations, vec![2., 3.]);

        let mut cx = AllocateCx::new(Axis::Y, 4., &children);
        row.allocate(&mut cx);
        assert_eq!(cx.allocations, vec![4., 4.]);
    }

    #[test]
    fn spacing_separates_children() {
        let mut state = State::new();
        state.insert("spacing".into(), 1.into());
        let mut column = Sequence::from_state(Axis::Y, &state);
        let children = [child(1., false), child(1., false), child(1., false)];

        let cx = MeasureCx {
            axis: Axis::Y,
            children: &children,
            allocated_width: Some(5.),
        };
        assert_eq!(column.measure(&cx), 5.);

        let mut cx = AllocateCx::new(Axis::Y, 5., &children);
        column.allocate(&mut cx);
        assert_eq!(cx.offsets, vec![0., 2., 4.]);
        assert!(!column.update(&state));
    }
}
