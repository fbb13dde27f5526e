//! XML deserialization of KAMAR response bodies.
//!
//! KAMAR wraps every leaf scalar in a one-element sequence: `<Key>abc</Key>`
//! inside `<LogonResults>` reads as `LogonResults.Key[0] == "abc"`. [`Node`]
//! keeps that shape — children are grouped by tag name in document order —
//! and the leaf accessors always take element `[0]`, so decoders never index
//! into ambient structure by hand.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::KamarError;

/// One element of a parsed response body.
#[derive(Debug, Clone, Default)]
pub struct Node {
    children: BTreeMap<String, Vec<Node>>,
    text: String,
}

impl Node {
    /// Parse a raw response body into a synthetic root node whose children
    /// are the document's top-level elements.
    pub fn parse(body: &str) -> Result<Node, KamarError> {
        let mut reader = Reader::from_str(body);
        reader.config_mut().trim_text(true);

        // Stack of open elements; index 0 is the synthetic root.
        let mut stack: Vec<(String, Node)> = vec![(String::new(), Node::default())];

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    stack.push((name, Node::default()));
                }
                Ok(Event::Empty(ref e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if let Some((_, parent)) = stack.last_mut() {
                        parent.children.entry(name).or_default().push(Node::default());
                    }
                }
                Ok(Event::End(_)) => {
                    let Some((name, node)) = stack.pop() else {
                        return Err(KamarError::decode("<xml>", "unbalanced end tag"));
                    };
                    let Some((_, parent)) = stack.last_mut() else {
                        return Err(KamarError::decode("<xml>", "end tag above document root"));
                    };
                    parent.children.entry(name).or_default().push(node);
                }
                Ok(Event::Text(ref e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| KamarError::decode("<xml>", err.to_string()))?;
                    if let Some((_, node)) = stack.last_mut() {
                        node.text.push_str(&text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some((_, node)) = stack.last_mut() {
                        node.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => return Err(KamarError::decode("<xml>", err.to_string())),
            }
        }

        if stack.len() != 1 {
            return Err(KamarError::decode("<xml>", "unclosed element at end of document"));
        }
        Ok(stack.pop().map(|(_, root)| root).unwrap_or_default())
    }

    /// Every child element with this tag, in document order.
    pub fn all(&self, tag: &str) -> &[Node] {
        self.children.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Element `[0]` for this tag.
    pub fn first(&self, tag: &str) -> Option<&Node> {
        self.all(tag).first()
    }

    /// Trimmed text content of this element.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Text of child `tag[0]`, if the child exists.
    pub fn leaf(&self, tag: &str) -> Option<&str> {
        self.first(tag).map(Node::text)
    }

    /// Child `tag[0]`, or a decode error naming the missing tag.
    pub fn require(&self, tag: &str) -> Result<&Node, KamarError> {
        self.first(tag)
            .ok_or_else(|| KamarError::decode(tag, "missing element"))
    }

    /// Text of child `tag[0]`, or a decode error naming the missing tag.
    pub fn require_leaf(&self, tag: &str) -> Result<&str, KamarError> {
        self.require(tag).map(Node::text)
    }

    /// Integer value of child `tag[0]`; absent or blank reads as 0.
    pub fn int(&self, tag: &str) -> Result<i32, KamarError> {
        match self.leaf(tag) {
            None => Ok(0),
            Some("") => Ok(0),
            Some(s) => s
                .parse()
                .map_err(|_| KamarError::decode(tag, format!("expected an integer, got {s:?}"))),
        }
    }

    /// Walk a fixed path of `[0]` children, reporting the full dotted path on
    /// the first missing hop.
    pub fn walk(&self, path: &[&str]) -> Result<&Node, KamarError> {
        let mut node = self;
        for (i, tag) in path.iter().enumerate() {
            node = node
                .first(tag)
                .ok_or_else(|| KamarError::decode(path[..=i].join("."), "missing element"))?;
        }
        Ok(node)
    }

    /// Tag names of the direct children.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Number of distinct child tags.
    pub fn key_count(&self) -> usize {
        self.children.len()
    }

    /// Flatten the direct leaf children into a field map. Used for response
    /// records the service already ships flat (absence statistics).
    pub fn fields(&self) -> BTreeMap<String, String> {
        self.children
            .iter()
            .filter_map(|(tag, nodes)| {
                nodes
                    .first()
                    .filter(|n| n.children.is_empty())
                    .map(|n| (tag.clone(), n.text().to_string()))
            })
            .collect()
    }

    /// Detach the sole top-level element, erroring when the document does not
    /// have exactly one.
    pub(crate) fn into_sole_child(mut self) -> Result<(String, Node), KamarError> {
        if self.children.len() != 1 {
            return Err(KamarError::decode(
                "<root>",
                format!("expected a single result element, found {}", self.children.len()),
            ));
        }
        let tag = self.children.keys().next().cloned().unwrap_or_default();
        let mut nodes = self.children.remove(&tag).unwrap_or_default();
        if nodes.is_empty() {
            return Err(KamarError::decode(tag, "empty result element"));
        }
        Ok((tag, nodes.swap_remove(0)))
    }
}
