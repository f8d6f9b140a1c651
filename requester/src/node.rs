//! Tagged tree used for both request parameters and decoded responses.
//!
//! The API's XML maps to a tree whose shape depends on cardinality: an element
//! that repeats becomes a sequence, a single one does not. Modelling the three
//! shapes explicitly lets traversal code match exhaustively.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A scalar, an ordered sequence, or an ordered keyed mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Scalar(String),
    Sequence(Vec<Node>),
    /// Entries in insertion (or document) order. Keys are expected to be
    /// unique; [`Node::get`] returns the first match if they are not.
    Mapping(Vec<(String, Node)>),
}

impl Node {
    /// Build a mapping from key/value pairs, keeping their order.
    pub fn mapping<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Node>,
    {
        Self::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// The scalar text, if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Direct child of a mapping by key.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Self::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Keys of a mapping in order; empty for scalars and sequences.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let entries: &[(String, Node)] = match self {
            Self::Mapping(entries) => entries.as_slice(),
            _ => &[],
        };
        entries.iter().map(|(k, _)| k.as_str())
    }

    /// True for an empty scalar, sequence, or mapping.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(s) => s.is_empty(),
            Self::Sequence(items) => items.is_empty(),
            Self::Mapping(entries) => entries.is_empty(),
        }
    }

    /// Insert or replace a mapping entry, keeping the position of an existing key.
    ///
    /// No-op on scalars and sequences.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Node>) {
        if let Self::Mapping(entries) = self {
            let key = key.into();
            let value = value.into();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<&String> for Node {
    fn from(s: &String) -> Self {
        Self::Scalar(s.clone())
    }
}

macro_rules! scalar_from_display {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Node {
                fn from(v: $t) -> Self {
                    Self::Scalar(v.to_string())
                }
            }
        )*
    };
}

scalar_from_display!(i32, i64, u32, u64, usize, f64, bool);

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(items: Vec<T>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(s) => serializer.serialize_str(s),
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_preserves_order() {
        let node = Node::mapping([("b", "2"), ("a", "1")]);
        assert_eq!(node.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(node.get("a").and_then(Node::as_str), Some("1"));
        assert!(node.get("missing").is_none());
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut node = Node::mapping([("Operation", "old"), ("AssignmentId", "A1")]);
        node.set("Operation", "GetAssignment");
        node.set("Version", "2014-08-15");

        assert_eq!(
            node.keys().collect::<Vec<_>>(),
            vec!["Operation", "AssignmentId", "Version"]
        );
        assert_eq!(node.get("Operation").and_then(Node::as_str), Some("GetAssignment"));
    }

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(Node::from(3u32), Node::Scalar("3".into()));
        assert_eq!(Node::from(1.25), Node::Scalar("1.25".into()));
        assert_eq!(
            Node::from(vec!["x", "y"]),
            Node::Sequence(vec![Node::from("x"), Node::from("y")])
        );
    }

    #[test]
    fn test_serialize_keeps_document_order() {
        let node = Node::mapping([
            ("Z", Node::from("last-alphabetically")),
            ("A", Node::from(vec!["1", "2"])),
        ]);
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, r#"{"Z":"last-alphabetically","A":["1","2"]}"#);
    }

    #[test]
    fn test_is_empty() {
        assert!(Node::from("").is_empty());
        assert!(Node::Sequence(vec![]).is_empty());
        assert!(!Node::mapping([("k", "v")]).is_empty());
    }
}
