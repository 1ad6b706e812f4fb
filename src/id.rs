//! Node identifiers.

use core::borrow::Borrow;
use core::fmt;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

/// Identifies a node across batches.
///
/// Backend ids are opaque strings; integer ids sent by the backend are normalized to their decimal
/// representation so that `6` and `"6"` name the same node.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> NodeId {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses a child reference out of a state property value.
    ///
    /// Strings and non-negative integers are ids; anything else is not.
    pub fn from_value(value: &Value) -> Option<NodeId> {
        match value {
            Value::String(s) => Some(NodeId(s.clone())),
            Value::Number(n) => n
                .as_u64()
                .map(|n| NodeId(n.to_string()))
                .or_else(|| n.as_i64().map(|n| NodeId(n.to_string()))),
            _ => None,
        }
    }

    /// The id of this node’s decorator of the given kind.
    pub fn decorator(&self, kind: DecoratorKind) -> NodeId {
        NodeId(format!("{}:{}", self.0, kind.suffix()))
    }

    /// If this is a synthetic decorator id, returns the host id and the decorator kind.
    pub fn decorator_host(&self) -> Option<(NodeId, DecoratorKind)> {
        let (host, suffix) = self.0.rsplit_once(':')?;
        let kind = DecoratorKind::from_suffix(suffix)?;
        Some((NodeId(host.to_string()), kind))
    }

    pub fn is_synthetic(&self) -> bool {
        self.decorator_host().is_some()
    }

    /// Strips any decorator suffixes, returning the real node this id belongs to.
    pub fn base(&self) -> NodeId {
        let mut id = self.clone();
        while let Some((host, _)) = id.decorator_host() {
            id = host;
        }
        id
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> NodeId {
        NodeId(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> NodeId {
        NodeId(id)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> NodeId {
        NodeId(id.to_string())
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Value {
        Value::String(id.0)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<NodeId, D::Error> {
        struct NodeIdVisitor;

        impl<'de> Visitor<'de> for NodeIdVisitor {
            type Value = NodeId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a node id (string or integer)")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<NodeId, E> {
                Ok(NodeId::from(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<NodeId, E> {
                Ok(NodeId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<NodeId, E> {
                Ok(NodeId::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<NodeId, E> {
                Ok(NodeId(v.to_string()))
            }
        }

        deserializer.deserialize_any(NodeIdVisitor)
    }
}

/// Kinds of synthetic nodes the reconciler inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoratorKind {
    Margin,
    Align,
}

impl DecoratorKind {
    fn suffix(self) -> &'static str {
        match self {
            DecoratorKind::Margin => "margin",
            DecoratorKind::Align => "align",
        }
    }

    fn from_suffix(suffix: &str) -> Option<DecoratorKind> {
        match suffix {
            "margin" => Some(DecoratorKind::Margin),
            "align" => Some(DecoratorKind::Align),
            _ => None,
        }
    }

    /// The type tag stored in a decorator’s state.
    ///
    /// The factory never sees these; a backend sending one is treated as an unknown type.
    pub fn type_tag(self) -> &'static str {
        match self {
            DecoratorKind::Margin => "$margin",
            DecoratorKind::Align => "$align",
        }
    }

    pub fn from_type_tag(tag: &str) -> Option<DecoratorKind> {
        match tag {
            "$margin" => Some(DecoratorKind::Margin),
            "$align" => Some(DecoratorKind::Align),
            _ => None,
        }
    }
}

/// A unique identifier for one component instance.
///
/// Unlike [`NodeId`], this changes whenever a node is rebuilt, so it can be used to tell whether
/// an id kept its instance across batches.
///
/// (this is just a UUID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub(crate) fn new() -> InstanceId {
        InstanceId(Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_and_string_ids_match() {
        assert_eq!(NodeId::from_value(&json!(6)), Some(NodeId::from("6")));
        assert_eq!(NodeId::from_value(&json!("6")), Some(NodeId::from("6")));
        assert_eq!(NodeId::from_value(&json!(null)), None);
        assert_eq!(NodeId::from_value(&json!(1.5)), None);
    }

    #[test]
    fn decorator_ids_round_to_host() {
        let id = NodeId::from("7");
        let margin = id.decorator(DecoratorKind::Margin);
        assert_eq!(margin.as_str(), "7:margin");
        assert_eq!(margin.decorator_host(), Some((id.clone(), DecoratorKind::Margin)));

        let align = id.decorator(DecoratorKind::Align);
        assert_eq!(align.as_str(), "7:align");
        assert_eq!(align.base(), id);
        assert!(!id.is_synthetic());
        assert!(NodeId::from("a:b").decorator_host().is_none());
    }
}
