use crate::component::{Component, Focusable, MeasureCx};
use crate::rect::Axis;
use crate::state::State;
use core::any::Any;
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

/// A single-line, focusable push button.
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    label: String,
    enabled: bool,
    focused: bool,
}

impl Button {
    pub fn from_state(state: &State) -> Button {
        let mut button = Button {
            label: String::new(),
            enabled: true,
            focused: false,
        };
        button.update(state);
        button
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }
}

impl Component for Button {
    fn measure(&self, cx: &MeasureCx) -> f64 {
        match cx.axis {
            // one cell of padding on each side
            Axis::X => self.label.width() as f64 + 2.,
            Axis::Y => 1.,
        }
    }

    fn update(&mut self, state: &State) -> bool {
        self.enabled = state.get("enabled").and_then(Value::as_bool).unwrap_or(true);
        let label = state.get("label").and_then(Value::as_str).unwrap_or("");
        if label == self.label {
            return false;
        }
        self.label = label.to_string();
        true
    }

    fn focusable(&self) -> Option<&dyn Focusable> {
        Some(self)
    }

    fn focusable_mut(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Focusable for Button {
    fn can_accept_focus(&self) -> bool {
        self.enabled
    }

    fn grab_focus(&mut self) {
        self.focused = true;
    }

    fn release_focus(&mut self) {
        self.focused = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn disabled_buttons_refuse_focus() {
        let state = json!({ "label": "OK", "enabled": false });
        let mut button = Button::from_state(state.as_object().unwrap());
        assert_eq!(button.label(), "OK");
        assert!(!button.focusable().unwrap().can_accept_focus());

        let enabled = json!({ "label": "OK" });
        assert!(!button.update(enabled.as_object().unwrap()), "label did not change");
        let focus = button.focusable_mut().unwrap();
        assert!(focus.can_accept_focus());
        focus.grab_focus();
        assert!(button.is_focused());
    }
}
