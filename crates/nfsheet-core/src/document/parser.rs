//! Folding quick-xml events into a [`ParsedDocument`].

use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use super::{Node, NodeMap, ParsedDocument};
use crate::error::DocumentError;

/// An element still being read.
struct OpenElement {
    name: String,
    children: NodeMap,
    text: String,
    has_attributes: bool,
}

impl OpenElement {
    fn start(element: &BytesStart<'_>, decoder: Decoder) -> Result<Self, DocumentError> {
        let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
        let mut children = NodeMap::new();
        let mut has_attributes = false;

        for attr in element.attributes() {
            let attr = attr.map_err(|e| DocumentError::Parse(e.to_string()))?;
            let key = attr.key.as_ref();
            if key == b"xmlns" || key.starts_with(b"xmlns:") {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let raw = decoder
                .decode(&attr.value)
                .map_err(|e| DocumentError::Encoding(e.to_string()))?;
            let value = unescape(&raw).map_err(|e| DocumentError::Parse(e.to_string()))?;
            children.insert(format!("@{key}"), Node::Text(value.into_owned()));
            has_attributes = true;
        }

        Ok(Self {
            name,
            children,
            text: String::new(),
            has_attributes,
        })
    }

    fn finish(self) -> (String, Node) {
        let node = if self.children.is_empty() && !self.has_attributes {
            Node::Text(self.text)
        } else {
            let mut children = self.children;
            if !self.text.is_empty() {
                children.insert("#text", Node::Text(self.text));
            }
            Node::Map(children)
        };
        (self.name, node)
    }
}

/// Decode raw file bytes into text.
///
/// A UTF-8 byte order mark is dropped. The encoding named in the XML
/// declaration (e.g. `ISO-8859-1`) is honoured; without one the bytes must be
/// UTF-8.
pub fn decode_document(bytes: &[u8]) -> Result<String, DocumentError> {
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    // Reading the declaration switches the reader's decoder to its encoding.
    let mut reader = Reader::from_reader(body);
    if let Err(e) = reader.read_event() {
        return Err(DocumentError::Parse(format!(
            "at position {}: {e}",
            reader.error_position()
        )));
    }

    let text = reader
        .decoder()
        .decode(body)
        .map_err(|e| DocumentError::Encoding(e.to_string()))?;
    Ok(text.into_owned())
}

/// Parse an XML string into a nested key-value tree.
pub fn parse_document(xml: &str) -> Result<ParsedDocument, DocumentError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let decoder = reader.decoder();

    let mut root = NodeMap::new();
    let mut stack: Vec<OpenElement> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(OpenElement::start(e, decoder)?);
            }
            Ok(Event::Empty(ref e)) => {
                let (name, node) = OpenElement::start(e, decoder)?.finish();
                attach(&mut stack, &mut root, name, node);
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| DocumentError::Parse(err.to_string()))?;
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                let open = stack
                    .pop()
                    .ok_or_else(|| DocumentError::Parse("unexpected closing tag".into()))?;
                let (name, node) = open.finish();
                attach(&mut stack, &mut root, name, node);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocumentError::Parse(format!(
                    "at position {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DocumentError::Parse(format!("unclosed element <{}>", open.name)));
    }
    if root.is_empty() {
        return Err(DocumentError::Empty);
    }

    Ok(ParsedDocument::new(root))
}

fn attach(stack: &mut [OpenElement], root: &mut NodeMap, name: String, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.insert(name, node),
        None => root.insert(name, node),
    }
}
