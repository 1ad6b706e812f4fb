use crate::component::{Component, MeasureCx};
use crate::rect::Axis;
use crate::state::State;
use core::any::Any;
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

/// A text label measured in terminal-style cells.
///
/// With `wrap` set, the natural width is that of the widest word and the height depends on the
/// allocated width, which is why heights are measured after widths are allocated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    text: String,
    wrap: bool,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Text {
        Text {
            text: text.into(),
            wrap: false,
        }
    }

    pub fn from_state(state: &State) -> Text {
        let mut text = Text::default();
        text.update(state);
        text
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of lines when laid out in the given width.
    pub fn line_count(&self, width: Option<f64>) -> usize {
        if self.text.is_empty() {
            return 0;
        }
        match width {
            Some(width) if self.wrap => self.text.lines().map(|line| wrapped_lines(line, width)).sum(),
            _ => self.text.lines().count().max(1),
        }
    }
}

/// Greedy word wrap; words wider than the line get a line of their own.
fn wrapped_lines(line: &str, width: f64) -> usize {
    let mut lines = 1;
    let mut current = 0.;
    for word in line.split_whitespace() {
        let word_width = word.width() as f64;
        if current == 0. {
            current = word_width;
        } else if current + 1. + word_width <= width {
            current += 1. + word_width;
        } else {
            lines += 1;
            current = word_width;
        }
    }
    lines
}

impl Component for Text {
    fn measure(&self, cx: &MeasureCx) -> f64 {
        match cx.axis {
            Axis::X if self.wrap => self
                .text
                .split_whitespace()
                .map(UnicodeWidthStr::width)
                .max()
                .unwrap_or(0) as f64,
            Axis::X => self.text.lines().map(UnicodeWidthStr::width).max().unwrap_or(0) as f64,
            Axis::Y => self.line_count(cx.allocated_width) as f64,
        }
    }

    fn update(&mut self, state: &State) -> bool {
        let text = state.get("text").and_then(Value::as_str).unwrap_or("");
        let wrap = state.get("wrap").and_then(Value::as_bool).unwrap_or(false);
        if text == self.text && wrap == self.wrap {
            return false;
        }
        self.text = text.to_string();
        self.wrap = wrap;
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
