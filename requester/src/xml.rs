//! XML → [`Node`] decoding.
//!
//! Shape rules:
//! - the document becomes a mapping holding the root element
//! - an element with only text becomes a scalar (empty elements → `""`)
//! - an element with children or attributes becomes a mapping; attributes are
//!   keyed `@name`, non-blank text alongside children is keyed `#text`
//! - repeated sibling tags collapse into a sequence in document order

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{RequesterError, RequesterResult};
use crate::node::Node;

struct Frame {
    name: String,
    children: Vec<(String, Node)>,
    has_markup: bool,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> RequesterResult<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut children = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| RequesterError::Decode(e.to_string()))?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr
                .unescape_value()
                .map_err(|e| RequesterError::Decode(e.to_string()))?;
            children.push((key, Node::Scalar(value.into_owned())));
        }
        let has_markup = !children.is_empty();
        Ok(Self {
            name,
            children,
            has_markup,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Node) {
        let text = self.text.trim();
        let node = if self.has_markup {
            let mut children = self.children;
            if !text.is_empty() {
                children.push(("#text".to_string(), Node::Scalar(text.to_string())));
            }
            Node::Mapping(children)
        } else {
            Node::Scalar(text.to_string())
        };
        (self.name, node)
    }

    fn adopt(&mut self, name: String, node: Node) {
        self.has_markup = true;
        insert_child(&mut self.children, name, node);
    }
}

/// Add a child, turning a repeated tag into a sequence.
fn insert_child(children: &mut Vec<(String, Node)>, name: String, node: Node) {
    match children.iter_mut().find(|(k, _)| *k == name) {
        Some((_, Node::Sequence(items))) => items.push(node),
        Some((_, existing)) => {
            let first = std::mem::replace(existing, Node::Sequence(Vec::new()));
            *existing = Node::Sequence(vec![first, node]);
        }
        None => children.push((name, node)),
    }
}

/// Decode an XML document into a [`Node`] tree.
pub fn decode(xml: &str) -> RequesterResult<Node> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Vec<(String, Node)> = Vec::new();

    let mut finish = |stack: &mut Vec<Frame>, name: String, node: Node| match stack.last_mut() {
        Some(parent) => parent.adopt(name, node),
        None => insert_child(&mut root, name, node),
    };

    loop {
        let event = reader
            .read_event()
            .map_err(|e| RequesterError::Decode(format!("at byte {}: {e}", reader.buffer_position())))?;
        match event {
            Event::Start(start) => stack.push(Frame::open(&start)?),
            Event::Empty(start) => {
                let (name, node) = Frame::open(&start)?.close();
                finish(&mut stack, name, node);
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| RequesterError::Decode("unbalanced closing tag".to_string()))?;
                let (name, node) = frame.close();
                finish(&mut stack, name, node);
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| RequesterError::Decode(e.to_string()))?;
                    frame.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(RequesterError::Decode(format!(
            "unexpected end of document inside <{}>",
            stack.last().map(|f| f.name.as_str()).unwrap_or_default()
        )));
    }
    if root.is_empty() {
        return Err(RequesterError::Decode("document has no root element".to_string()));
    }
    Ok(Node::Mapping(root))
}
