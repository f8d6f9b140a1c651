//! Depth-first field search over a response tree.
//!
//! The API nests the same field at different depths depending on the
//! operation, so callers search by name instead of by path. At every mapping
//! node two rules apply, in order:
//!
//! 1. a mapping whose keys are exactly `{Key, Value}` with `Key == name`
//!    yields its `Value`
//! 2. a mapping with a direct `name` entry yields that entry
//!
//! Children are then visited in order whether or not the node matched.

use crate::node::Node;

enum Step<'a> {
    Visit(&'a Node),
    Yield(&'a Node),
}

/// Lazy pre-order iterator over every match for a field name.
pub struct Matches<'a, 'n> {
    name: &'n str,
    stack: Vec<Step<'a>>,
}

impl<'a> Iterator for Matches<'a, '_> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(step) = self.stack.pop() {
            match step {
                Step::Yield(found) => return Some(found),
                Step::Visit(node) => match node {
                    Node::Scalar(_) => {}
                    Node::Sequence(items) => {
                        self.stack.extend(items.iter().rev().map(Step::Visit));
                    }
                    Node::Mapping(entries) => {
                        self.stack
                            .extend(entries.iter().rev().map(|(_, v)| Step::Visit(v)));
                        if let Some(direct) = node.get(self.name) {
                            self.stack.push(Step::Yield(direct));
                        }
                        if let Some(value) = key_value_match(node, self.name) {
                            self.stack.push(Step::Yield(value));
                        }
                    }
                },
            }
        }
        None
    }
}

fn key_value_match<'a>(node: &'a Node, name: &str) -> Option<&'a Node> {
    let Node::Mapping(entries) = node else {
        return None;
    };
    if entries.len() != 2 {
        return None;
    }
    let key = node.get("Key")?;
    let value = node.get("Value")?;
    (key.as_str() == Some(name)).then_some(value)
}

/// Every value matching `name`, in traversal order.
pub fn find<'a, 'n>(tree: &'a Node, name: &'n str) -> Matches<'a, 'n> {
    Matches {
        name,
        stack: vec![Step::Visit(tree)],
    }
}

/// First value matching `name`, if any.
pub fn lookup<'a>(tree: &'a Node, name: &str) -> Option<&'a Node> {
    find(tree, name).next()
}
