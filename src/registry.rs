//! Type registries injected into the reconciler: which constructor builds a type, and which
//! state properties of a type hold child ids.

use crate::component::{Component, ComponentFactory};
use crate::components::{Button, Scroll, Sequence, Stack, Text};
use crate::error::FactoryError;
use crate::id::DecoratorKind;
use crate::rect::Axis;
use crate::state::State;
use core::fmt;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// The property holding a decorator’s single child.
pub(crate) const DECORATOR_CHILD: &str = "child";

/// Maps type tags to the state properties that hold child id(s).
///
/// Types without an entry have no children.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildAttributes {
    types: HashMap<String, Vec<String>>,
    decorator: Vec<String>,
    none: Vec<String>,
}

impl ChildAttributes {
    /// An empty registry (decorators still know their child).
    pub fn empty() -> ChildAttributes {
        ChildAttributes {
            types: HashMap::new(),
            decorator: vec![DECORATOR_CHILD.to_string()],
            none: Vec::new(),
        }
    }

    /// Registers the child properties of a type, replacing any previous entry.
    pub fn insert<I, S>(&mut self, type_tag: impl Into<String>, attrs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types
            .insert(type_tag.into(), attrs.into_iter().map(Into::into).collect());
    }

    /// Returns the child properties of a type.
    pub fn for_type(&self, type_tag: &str) -> &[String] {
        if DecoratorKind::from_type_tag(type_tag).is_some() {
            return &self.decorator;
        }
        self.types.get(type_tag).unwrap_or(&self.none)
    }

    /// Returns true if a property of the given type holds child ids.
    pub fn is_child_attr(&self, type_tag: &str, key: &str) -> bool {
        self.for_type(type_tag).iter().any(|attr| attr == key)
    }
}

impl Default for ChildAttributes {
    /// Child properties of the reference components.
    fn default() -> ChildAttributes {
        let mut attrs = ChildAttributes::empty();
        attrs.insert("Row", ["children"]);
        attrs.insert("Column", ["children"]);
        attrs.insert("Stack", ["children"]);
        attrs.insert("Scroll", ["content"]);
        attrs
    }
}

/// Deserializes as a map of type tag → property names, layered over the defaults.
impl<'de> Deserialize<'de> for ChildAttributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<ChildAttributes, D::Error> {
        let types = HashMap::<String, Vec<String>>::deserialize(deserializer)?;
        let mut attrs = ChildAttributes::default();
        attrs.types.extend(types);
        Ok(attrs)
    }
}

type Constructor = Box<dyn Fn(&State) -> Result<Box<dyn Component>, FactoryError>>;

/// A [`ComponentFactory`] backed by a table of constructors.
pub struct Registry {
    constructors: HashMap<String, Constructor>,
}

impl Registry {
    /// A registry that knows no types at all.
    pub fn new() -> Registry {
        Registry {
            constructors: HashMap::new(),
        }
    }

    /// A registry with the reference components.
    pub fn with_builtins() -> Registry {
        let mut registry = Registry::new();
        registry.register("Row", |s| Ok(Box::new(Sequence::from_state(Axis::X, s))));
        registry.register("Column", |s| Ok(Box::new(Sequence::from_state(Axis::Y, s))));
        registry.register("Stack", |_| Ok(Box::new(Stack)));
        registry.register("Text", |s| Ok(Box::new(Text::from_state(s))));
        registry.register("Button", |s| Ok(Box::new(Button::from_state(s))));
        registry.register("Scroll", |s| Ok(Box::new(Scroll::from_state(s))));
        registry
    }

    /// Registers a constructor for a type tag, replacing any previous one.
    pub fn register<F>(&mut self, type_tag: impl Into<String>, constructor: F)
    where
        F: Fn(&State) -> Result<Box<dyn Component>, FactoryError> + 'static,
    {
        self.constructors
            .insert(type_tag.into(), Box::new(constructor));
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.constructors.contains_key(type_tag)
    }
}

impl Default for Registry {
    fn default() -> Registry {
        Registry::with_builtins()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut types: Vec<_> = self.constructors.keys().collect();
        types.sort();
        f.debug_struct("Registry").field("types", &types).finish()
    }
}

impl ComponentFactory for Registry {
    fn create(&self, type_tag: &str, state: &State) -> Result<Box<dyn Component>, FactoryError> {
        match self.constructors.get(type_tag) {
            Some(constructor) => constructor(state),
            None => Err(FactoryError::UnknownType(type_tag.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_attributes_layer_over_defaults() {
        let attrs: ChildAttributes =
            serde_json::from_str(r#"{ "Tabs": ["tabs", "header"], "Row": ["items"] }"#).unwrap();
        assert_eq!(attrs.for_type("Tabs"), ["tabs", "header"]);
        assert_eq!(attrs.for_type("Row"), ["items"]);
        assert_eq!(attrs.for_type("Scroll"), ["content"]);
        assert!(attrs.for_type("Text").is_empty());
        assert_eq!(attrs.for_type("$margin"), ["child"]);
        assert!(attrs.is_child_attr("Tabs", "header"));
    }

    #[test]
    fn registry_rejects_unknown_types() {
        let registry = Registry::with_builtins();
        assert!(registry.contains("Row"));
        assert!(registry.create("Text", &State::new()).is_ok());
        match registry.create("Marquee", &State::new()) {
            Err(FactoryError::UnknownType(tag)) => assert_eq!(tag, "Marquee"),
            other => panic!("expected unknown type, got {:?}", other.map(|_| ())),
        }
    }
}
