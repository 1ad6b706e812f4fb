use crate::component::{Allocate, AllocateCx, Component, MeasureCx};
use crate::rect::Axis;
use crate::state::State;
use core::any::Any;
use serde_json::Value;

/// Width of the vertical scrollbar.
const SCROLLBAR_WIDTH: f64 = 1.;

/// A vertically scrolling viewport around its `content` child.
///
/// Whether the scrollbar is shown is only known once heights are allocated, but showing it
/// narrows the content, which may change the content’s height. When the guess made during width
/// allocation turns out wrong, the height allocation asks for a re-pass.
///
/// The viewport has no natural height of its own; give it a `height` or let it grow.
#[derive(Debug, Clone, PartialEq)]
pub struct Scroll {
    scrollbar: bool,
    scroll: f64,
}

impl Scroll {
    pub fn from_state(state: &State) -> Scroll {
        let mut scroll = Scroll {
            scrollbar: false,
            scroll: 0.,
        };
        scroll.update(state);
        scroll
    }

    pub fn scrollbar_visible(&self) -> bool {
        self.scrollbar
    }
}

impl Component for Scroll {
    fn measure(&self, cx: &MeasureCx) -> f64 {
        match cx.axis {
            Axis::X => cx.max_child(),
            Axis::Y => 0.,
        }
    }

    fn allocate(&mut self, cx: &mut AllocateCx) -> Allocate {
        match cx.axis {
            Axis::X => {
                let width = if self.scrollbar {
                    (cx.size - SCROLLBAR_WIDTH).max(0.)
                } else {
                    cx.size
                };
                for i in 0..cx.children.len() {
                    cx.set(i, width, 0.);
                }
                Allocate::Done
            }
            Axis::Y => {
                let content = cx.max_child();
                let overflow = (content - cx.size).max(0.);
                let offset = -self.scroll.max(0.).min(overflow);
                for i in 0..cx.children.len() {
                    let height = cx.size.max(cx.children[i].requested);
                    cx.set(i, height, offset);
                }

                let needs_scrollbar = overflow > 0.;
                if needs_scrollbar != self.scrollbar {
                    self.scrollbar = needs_scrollbar;
                    Allocate::Relayout
                } else {
                    Allocate::Done
                }
            }
        }
    }

    fn update(&mut self, state: &State) -> bool {
        let scroll = state.get("scroll").and_then(Value::as_f64).unwrap_or(0.);
        let changed = scroll != self.scroll;
        self.scroll = scroll;
        changed
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ChildSize;

    fn content(requested: f64) -> [ChildSize; 1] {
        [ChildSize {
            natural: requested,
            requested,
            grow: false,
        }]
    }

    #[test]
    fn asks_for_relayout_when_scrollbar_guess_flips() {
        let mut scroll = Scroll::from_state(&State::new());

        let children = content(10.);
        let mut cx = AllocateCx::new(Axis::X, 20., &children);
        assert_eq!(scroll.allocate(&mut cx), Allocate::Done);
        assert_eq!(cx.allocation(0), 20.);

        let children = content(12.);
        let mut cx = AllocateCx::new(Axis::Y, 5., &children);
        assert_eq!(scroll.allocate(&mut cx), Allocate::Relayout);
        assert!(scroll.scrollbar_visible());

        let children = content(10.);
        let mut cx = AllocateCx::new(Axis::X, 20., &children);
        scroll.allocate(&mut cx);
        assert_eq!(cx.allocation(0), 19.);

        let children = content(12.);
        let mut cx = AllocateCx::new(Axis::Y, 5., &children);
        assert_eq!(scroll.allocate(&mut cx), Allocate::Done);
    }

    #[test]
    fn scroll_offset_is_clamped() {
        let mut state = State::new();
        state.insert("scroll".into(), 100.into());
        let mut scroll = Scroll::from_state(&state);
        let children = content(12.);
        let mut cx = AllocateCx::new(Axis::Y, 5., &children);
        scroll.allocate(&mut cx);
        assert_eq!(cx.offsets, vec![-7.]);
        assert_eq!(cx.allocation(0), 12.);
    }
}
