//! Node state property bags and the reserved layout keys shared by every node type.

use crate::id::NodeId;
use crate::rect::Axis;
use serde_json::{Map, Value};
use tracing::warn;

/// A node’s property bag.
///
/// Partial states sent by the backend have the same shape; see [`merge`].
pub type State = Map<String, Value>;

/// The type tag key.
pub const TYPE_KEY: &str = "type";
pub const WIDTH_KEY: &str = "width";
pub const HEIGHT_KEY: &str = "height";
pub const MARGIN_KEY: &str = "margin";
pub const ALIGN_KEY: &str = "align";
pub const GROW_KEY: &str = "grow";
/// Tooling-only flag; kept in the debug side table rather than interpreted by the core.
pub const INTERNAL_KEY: &str = "internal";

/// Merges a partial state into a stored state and returns the keys whose value changed.
///
/// `null` removes a key, reverting it to its default. Everything else replaces the stored value.
pub fn merge(stored: &mut State, partial: &State) -> Vec<String> {
    let mut changed = Vec::new();
    for (key, value) in partial {
        if value.is_null() {
            if stored.remove(key).is_some() {
                changed.push(key.clone());
            }
        } else if stored.get(key) != Some(value) {
            stored.insert(key.clone(), value.clone());
            changed.push(key.clone());
        }
    }
    changed
}

/// Returns the state that would result from merging `partial` into `stored`.
pub fn merged(stored: Option<&State>, partial: &State) -> State {
    let mut state = stored.cloned().unwrap_or_default();
    merge(&mut state, partial);
    state
}

pub fn type_tag(state: &State) -> Option<&str> {
    state.get(TYPE_KEY).and_then(Value::as_str)
}

/// Returns all child ids referenced by the given properties, in order.
pub fn child_refs(state: &State, attrs: &[String]) -> Vec<NodeId> {
    let mut refs = Vec::new();
    for attr in attrs {
        match state.get(attr) {
            None | Some(Value::Null) => (),
            Some(Value::Array(items)) => {
                for item in items {
                    match NodeId::from_value(item) {
                        Some(id) => refs.push(id),
                        None => warn!(property = %attr, value = %item, "ignoring malformed child reference"),
                    }
                }
            }
            Some(value) => match NodeId::from_value(value) {
                Some(id) => refs.push(id),
                None => warn!(property = %attr, %value, "ignoring malformed child reference"),
            },
        }
    }
    refs
}

/// Rewrites every child reference in the given properties through `map`.
///
/// Returns true if anything changed. Non-id entries are left alone.
pub fn rewrite_child_refs<F>(state: &mut State, attrs: &[String], mut map: F) -> bool
where
    F: FnMut(&NodeId) -> NodeId,
{
    let mut changed = false;
    let mut rewrite = |value: &mut Value| {
        if let Some(id) = NodeId::from_value(value) {
            let new_id = map(&id);
            if new_id != id || !value.is_string() {
                changed |= new_id != id;
                *value = new_id.into();
            }
        }
    };

    for attr in attrs {
        match state.get_mut(attr) {
            Some(Value::Array(items)) => items.iter_mut().for_each(&mut rewrite),
            Some(value) if !value.is_null() => rewrite(value),
            _ => (),
        }
    }
    changed
}

/// Per-edge insets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    pub fn is_zero(&self) -> bool {
        self.top == 0. && self.right == 0. && self.bottom == 0. && self.left == 0.
    }

    /// The inset before content on an axis (left or top).
    pub fn leading(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.left,
            Axis::Y => self.top,
        }
    }

    /// Both insets on an axis combined.
    pub fn total(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.left + self.right,
            Axis::Y => self.top + self.bottom,
        }
    }

    pub(crate) fn parse(value: &Value) -> Option<Insets> {
        let edges: Vec<f64> = match value {
            Value::Number(n) => vec![n.as_f64()?],
            Value::Array(items) => items.iter().map(Value::as_f64).collect::<Option<_>>()?,
            _ => return None,
        };
        let (top, right, bottom, left) = match edges[..] {
            [all] => (all, all, all, all),
            [vertical, horizontal] => (vertical, horizontal, vertical, horizontal),
            [top, right, bottom, left] => (top, right, bottom, left),
            _ => return None,
        };
        Some(Insets {
            top,
            right,
            bottom,
            left,
        })
    }

    pub fn to_value(&self) -> Value {
        Value::from(vec![self.top, self.right, self.bottom, self.left])
    }
}

/// Alignment along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisAlign {
    /// Take up the whole axis.
    Fill,
    /// Keep the natural size and position at this fraction of the leftover space.
    Fraction(f64),
}

impl AxisAlign {
    pub(crate) fn parse(value: &Value) -> Option<Option<AxisAlign>> {
        match value {
            Value::Null => Some(None),
            Value::String(s) if s == "fill" => Some(Some(AxisAlign::Fill)),
            Value::Number(n) => n.as_f64().map(|f| Some(AxisAlign::Fraction(f.max(0.).min(1.)))),
            _ => None,
        }
    }

    fn to_value(align: Option<AxisAlign>) -> Value {
        match align {
            None => Value::Null,
            Some(AxisAlign::Fill) => Value::from("fill"),
            Some(AxisAlign::Fraction(f)) => Value::from(f),
        }
    }
}

/// The reserved layout properties of a node, parsed out of its state.
///
/// Malformed values are logged and treated as their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutProps {
    /// Explicit size override per axis.
    pub size: [Option<f64>; 2],
    pub margin: Insets,
    pub align: [Option<AxisAlign>; 2],
    pub grow: [bool; 2],
}

impl LayoutProps {
    pub fn from_state(state: &State) -> LayoutProps {
        let mut props = LayoutProps::default();

        for (axis, key) in [(Axis::X, WIDTH_KEY), (Axis::Y, HEIGHT_KEY)] {
            props.size[axis.index()] = match state.get(key) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) if s == "natural" => None,
                Some(value) => match value.as_f64() {
                    Some(size) if size >= 0. => Some(size),
                    _ => {
                        warn!(property = key, %value, "ignoring malformed size override");
                        None
                    }
                },
            };
        }

        if let Some(value) = state.get(MARGIN_KEY).filter(|v| !v.is_null()) {
            match Insets::parse(value) {
                Some(margin) => props.margin = margin,
                None => warn!(%value, "ignoring malformed margin"),
            }
        }

        if let Some(value) = state.get(ALIGN_KEY).filter(|v| !v.is_null()) {
            let parsed = match value {
                Value::Array(items) if items.len() == 2 => {
                    AxisAlign::parse(&items[0]).zip(AxisAlign::parse(&items[1]))
                }
                _ => None,
            };
            match parsed {
                Some((x, y)) => props.align = [x, y],
                None => warn!(%value, "ignoring malformed alignment"),
            }
        }

        if let Some(value) = state.get(GROW_KEY).filter(|v| !v.is_null()) {
            match value {
                Value::Bool(grow) => props.grow = [*grow, *grow],
                Value::Array(items) if items.len() == 2 => {
                    match (items[0].as_bool(), items[1].as_bool()) {
                        (Some(x), Some(y)) => props.grow = [x, y],
                        _ => warn!(%value, "ignoring malformed grow flags"),
                    }
                }
                _ => warn!(%value, "ignoring malformed grow flags"),
            }
        }

        props
    }

    pub fn size(&self, axis: Axis) -> Option<f64> {
        self.size[axis.index()]
    }

    pub fn grows(&self, axis: Axis) -> bool {
        self.grow[axis.index()]
    }

    pub fn needs_margin(&self) -> bool {
        !self.margin.is_zero()
    }

    pub fn needs_align(&self) -> bool {
        self.align.iter().any(Option::is_some)
    }

    pub(crate) fn align_value(&self) -> Value {
        Value::from(vec![
            AxisAlign::to_value(self.align[0]),
            AxisAlign::to_value(self.align[1]),
        ])
    }

    pub(crate) fn grow_value(&self) -> Value {
        Value::from(vec![self.grow[0], self.grow[1]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(value: Value) -> State {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn merge_reports_changes_and_removes_nulls() {
        let mut stored = state(json!({ "type": "Text", "text": "Hi", "width": 4 }));
        let changed = merge(&mut stored, &state(json!({ "text": "Hi", "width": null, "wrap": true })));
        assert_eq!(changed, vec!["width".to_string(), "wrap".to_string()]);
        assert_eq!(stored, state(json!({ "type": "Text", "text": "Hi", "wrap": true })));

        let again = merge(&mut stored, &state(json!({ "text": "Hi", "width": null })));
        assert!(again.is_empty(), "identical partial state should not change anything");
    }

    #[test]
    fn layout_props_parse_reserved_keys() {
        let props = LayoutProps::from_state(&state(json!({
            "width": 10,
            "height": "natural",
            "margin": [1, 0, 0, 0],
            "align": [0.5, null],
            "grow": [true, false],
        })));
        assert_eq!(props.size, [Some(10.), None]);
        assert_eq!(props.margin.top, 1.);
        assert!(props.needs_margin());
        assert_eq!(props.align, [Some(AxisAlign::Fraction(0.5)), None]);
        assert!(props.grows(Axis::X) && !props.grows(Axis::Y));

        let zero = LayoutProps::from_state(&state(json!({ "margin": [0, 0, 0, 0], "align": [null, null] })));
        assert!(!zero.needs_margin() && !zero.needs_align());

        let shorthand = LayoutProps::from_state(&state(json!({ "margin": [2, 3], "grow": true })));
        assert_eq!(shorthand.margin.total(Axis::X), 6.);
        assert_eq!(shorthand.margin.total(Axis::Y), 4.);
        assert_eq!(shorthand.grow, [true, true]);
    }

    #[test]
    fn malformed_layout_props_fall_back_to_defaults() {
        let props = LayoutProps::from_state(&state(json!({
            "width": "wide",
            "margin": [1, 2, 3],
            "align": "center",
            "grow": "yes",
        })));
        assert_eq!(props, LayoutProps::default());
    }

    #[test]
    fn child_refs_are_rewritten_in_place() {
        let attrs = vec!["children".to_string(), "header".to_string()];
        let mut s = state(json!({ "children": [6, "7", {}], "header": 8 }));
        assert_eq!(
            child_refs(&s, &attrs),
            vec![NodeId::from("6"), NodeId::from("7"), NodeId::from("8")]
        );

        let changed = rewrite_child_refs(&mut s, &attrs, |id| {
            if id.as_str() == "7" {
                NodeId::from("7:margin")
            } else {
                id.clone()
            }
        });
        assert!(changed);
        assert_eq!(s, state(json!({ "children": ["6", "7:margin", {}], "header": "8" })));
    }
}
