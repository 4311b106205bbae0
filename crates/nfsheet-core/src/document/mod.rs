//! Parsed XML documents as nested key-value trees.
//!
//! Elements fold into [`Node`] values: leaf elements become text, elements
//! with children or attributes become ordered maps, and repeated siblings
//! collapse into a list in document order.

mod loader;
mod parser;

pub use loader::DocumentLoader;
pub use parser::{decode_document, parse_document};

use crate::error::ExtractionError;

/// A single node of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Text content of a leaf element (empty for `<tag/>`).
    Text(String),
    /// Repeated sibling elements sharing one name.
    List(Vec<Node>),
    /// Child elements and attributes keyed by name.
    Map(NodeMap),
}

impl Node {
    /// Get a child by key when this node is a map.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Text value of a leaf node.
    ///
    /// An element carrying attributes keeps its text under `#text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Map(map) => map.get("#text").and_then(Node::as_text),
            Node::List(_) => None,
        }
    }

    /// Iterate the node as a sequence.
    ///
    /// A list yields its elements; any other node yields itself once, so a
    /// single repeated element reads the same as a list of one.
    pub fn items(&self) -> std::slice::Iter<'_, Node> {
        match self {
            Node::List(items) => items.iter(),
            other => std::slice::from_ref(other).iter(),
        }
    }
}

/// Ordered map of child nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMap {
    entries: Vec<(String, Node)>,
}

impl NodeMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a child by name.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, node)| node)
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert a child, folding repeated names into a list.
    pub fn insert(&mut self, key: impl Into<String>, node: Node) {
        let key = key.into();
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some((_, Node::List(items))) => items.push(node),
            Some((_, existing)) => {
                let first = std::mem::replace(existing, Node::List(Vec::new()));
                *existing = Node::List(vec![first, node]);
            }
            None => self.entries.push((key, node)),
        }
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    root: NodeMap,
}

impl ParsedDocument {
    /// Wrap a root map (normally holding exactly one element).
    pub fn new(root: NodeMap) -> Self {
        Self { root }
    }

    /// The top-level map.
    pub fn root(&self) -> &NodeMap {
        &self.root
    }

    /// Name of the root element, if any.
    pub fn root_name(&self) -> Option<&str> {
        self.root.keys().next()
    }

    /// Start a path lookup from the document root.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor {
            node: None,
            root: &self.root,
            path: String::new(),
        }
    }

    /// Resolve a slash-separated path from the root.
    pub fn at(&self, path: &str) -> Result<Cursor<'_>, ExtractionError> {
        self.cursor().at(path)
    }
}

/// A position in a [`ParsedDocument`] that remembers the path walked to reach it.
///
/// Every failed step reports the full path, so a missing field error names
/// exactly which key was absent.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    node: Option<&'a Node>,
    root: &'a NodeMap,
    path: String,
}

impl<'a> Cursor<'a> {
    /// Path walked so far.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn join(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.path, key)
        }
    }

    fn lookup(&self, key: &str) -> Option<&'a Node> {
        match self.node {
            None => self.root.get(key),
            Some(node) => node.get(key),
        }
    }

    /// Step into a direct child.
    ///
    /// Stepping through a repeated element is an error: fixed paths address
    /// exactly one element at each level.
    pub fn child(&self, key: &str) -> Result<Cursor<'a>, ExtractionError> {
        self.try_child(key)?
            .ok_or_else(|| ExtractionError::MissingField(self.join(key)))
    }

    /// Step into a direct child, returning `None` when it is absent.
    pub fn try_child(&self, key: &str) -> Result<Option<Cursor<'a>>, ExtractionError> {
        if let Some(Node::List(_)) = self.node {
            return Err(ExtractionError::RepeatedElement(self.path.clone()));
        }
        Ok(self.lookup(key).map(|node| Cursor {
            node: Some(node),
            root: self.root,
            path: self.join(key),
        }))
    }

    /// Walk a slash-separated path of children.
    pub fn at(&self, path: &str) -> Result<Cursor<'a>, ExtractionError> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self.clone(), |cursor, segment| cursor.child(segment))
    }

    /// Text of the node at this position.
    pub fn text(&self) -> Result<String, ExtractionError> {
        if let Some(Node::List(_)) = self.node {
            return Err(ExtractionError::RepeatedElement(self.path.clone()));
        }
        self.node
            .and_then(Node::as_text)
            .map(str::to_string)
            .ok_or_else(|| ExtractionError::NotText(self.path.clone()))
    }

    /// Text of the node at a path below this position.
    pub fn text_at(&self, path: &str) -> Result<String, ExtractionError> {
        self.at(path)?.text()
    }

    /// Iterate repeated elements at this position.
    pub fn items(&self) -> impl Iterator<Item = Cursor<'a>> + '_ {
        let nodes = match self.node {
            Some(node) => node.items(),
            None => Default::default(),
        };
        nodes.enumerate().map(move |(index, node)| Cursor {
            node: Some(node),
            root: self.root,
            path: format!("{}[{}]", self.path, index),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ParsedDocument {
        parse_document(
            r#"<root><a><b>one</b><c/></a><item>1</item><item>2</item><tag attr="x">v</tag></root>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_repeated_siblings_fold_into_list() {
        let doc = sample();
        let items: Vec<String> = doc
            .at("root/item")
            .unwrap()
            .items()
            .map(|c| c.text().unwrap())
            .collect();
        assert_eq!(items, vec!["1", "2"]);
    }

    #[test]
    fn test_single_element_iterates_once() {
        let doc = sample();
        let count = doc.at("root/a").unwrap().items().count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_missing_field_reports_full_path() {
        let doc = sample();
        let err = doc.at("root/a/missing/deeper").unwrap_err();
        assert_eq!(err, ExtractionError::MissingField("root/a/missing".into()));
    }

    #[test]
    fn test_text_lookups() {
        let doc = sample();
        assert_eq!(doc.cursor().text_at("root/a/b").unwrap(), "one");
        assert_eq!(doc.cursor().text_at("root/a/c").unwrap(), "");
        assert_eq!(doc.cursor().text_at("root/tag").unwrap(), "v");
        assert_eq!(doc.cursor().text_at("root/tag/@attr").unwrap(), "x");
    }

    #[test]
    fn test_map_is_not_text() {
        let doc = sample();
        let err = doc.cursor().text_at("root/a").unwrap_err();
        assert_eq!(err, ExtractionError::NotText("root/a".into()));
    }

    #[test]
    fn test_repeated_element_on_fixed_path() {
        let doc = parse_document("<r><a><b>1</b></a><a><b>2</b></a></r>").unwrap();
        assert_eq!(
            doc.at("r/a/b").unwrap_err(),
            ExtractionError::RepeatedElement("r/a".into())
        );
        assert_eq!(
            doc.cursor().text_at("r/a").unwrap_err(),
            ExtractionError::RepeatedElement("r/a".into())
        );
        assert_eq!(
            doc.at("r/a").unwrap().try_child("b").unwrap_err(),
            ExtractionError::RepeatedElement("r/a".into())
        );
    }

    #[test]
    fn test_try_child_absent_is_none() {
        let doc = sample();
        assert!(doc.at("root/a").unwrap().try_child("zzz").unwrap().is_none());
        assert_eq!(
            doc.at("root/a").unwrap().try_child("b").unwrap().unwrap().path(),
            "root/a/b"
        );
    }

    #[test]
    fn test_root_name() {
        assert_eq!(sample().root_name(), Some("root"));
    }
}
