//! Flattening of nested request parameters into the API's query encoding.
//!
//! ```text
//! {A: {B: 1, C: 2}}        → A.B=1, A.C=2
//! {Z: [x, y]}              → Z1=x, Z2=y
//! {Z: [{K: v}]}            → Z1.K=v
//! ```
//!
//! Empty-string values are dropped. When two paths encode to the same key the
//! later one wins and a warning is logged.

use std::collections::BTreeMap;

use tracing::warn;

use crate::node::Node;

/// Flatten a parameter tree into single-level `path → value` pairs.
pub fn flatten(node: &Node) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    walk(node, String::new(), &mut out);
    out
}

fn walk(node: &Node, path: String, out: &mut BTreeMap<String, String>) {
    match node {
        Node::Scalar(value) => {
            if value.is_empty() {
                return;
            }
            if let Some(previous) = out.insert(path.clone(), value.clone()) {
                warn!(
                    key = %path,
                    previous = %previous,
                    replacement = %value,
                    "Flattened parameter key collision, keeping last value"
                );
            }
        }
        Node::Sequence(items) => {
            for (idx, item) in items.iter().enumerate() {
                walk(item, format!("{path}{}", idx + 1), out);
            }
        }
        Node::Mapping(entries) => {
            for (key, value) in entries {
                let child = if path.is_empty() {
                    key.clone()
                } else if key.is_empty() {
                    path.clone()
                } else {
                    format!("{path}.{key}")
                };
                walk(value, child, out);
            }
        }
    }
}
