//! Decoded API response.

use serde::Serialize;

use crate::error::RequesterResult;
use crate::navigator;
use crate::node::Node;
use crate::xml;

/// Immutable view of one API response: the decoded tree, the raw XML it came
/// from, and whether the API flagged the request as valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub tree: Node,
    pub xml: String,
    /// True iff the first `Request` node has `IsValid == "True"`.
    pub valid: bool,
}

impl Response {
    pub fn new(tree: Node, xml: impl Into<String>) -> Self {
        let valid = navigator::lookup(&tree, "Request")
            .and_then(|request| request.get("IsValid"))
            .and_then(Node::as_str)
            == Some("True");
        Self {
            tree,
            xml: xml.into(),
            valid,
        }
    }

    /// Decode a raw XML body.
    pub fn from_xml(xml: impl Into<String>) -> RequesterResult<Self> {
        let xml = xml.into();
        let tree = xml::decode(&xml)?;
        Ok(Self::new(tree, xml))
    }

    /// First value named `field` anywhere in the tree.
    pub fn lookup(&self, field: &str) -> Option<&Node> {
        navigator::lookup(&self.tree, field)
    }

    /// First value named `field`, when it is a scalar.
    pub fn lookup_str(&self, field: &str) -> Option<&str> {
        self.lookup(field).and_then(Node::as_str)
    }

    /// First error message reported by the API.
    pub fn error_message(&self) -> Option<&str> {
        self.lookup_str("Message")
    }
}
