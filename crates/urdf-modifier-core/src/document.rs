//! URDF/SDF document tree
//!
//! The tree keeps every parser event it does not interpret (declaration,
//! comments, whitespace, doctype), a leading byte order mark and the original
//! bytes of every start and end tag. Writing a document back therefore reproduces the input exactly,
//! except for the start tags that were modified through [`Element::set_attr`].

use std::borrow::Cow;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::QName;

const UTF8_BOM: char = '\u{feff}';

/// A node in the document tree
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    /// Any other event, kept verbatim
    Other(Event<'static>),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Other(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Other(_) => None,
        }
    }
}

/// An XML element with ordered attributes and children
#[derive(Debug, Clone)]
pub struct Element {
    start: BytesStart<'static>,
    /// `None` for a self-closing element that has not gained children
    end: Option<BytesEnd<'static>>,
    children: Vec<Node>,
}

impl Element {
    /// Create a self-closing element
    pub fn new_empty(name: &str, attributes: &[(&str, &str)]) -> Self {
        let mut start = BytesStart::new(name.to_string());
        for &(key, value) in attributes {
            start.push_attribute((key, value));
        }
        Self {
            start,
            end: None,
            children: Vec::new(),
        }
    }

    /// Element name, e.g. `link`
    pub fn name(&self) -> &str {
        std::str::from_utf8(self.start.name().into_inner()).unwrap_or("")
    }

    /// Unescaped attribute value
    pub fn attr(&self, key: &str) -> Option<String> {
        self.start
            .attributes()
            .flatten()
            .find(|a| a.key.as_ref() == key.as_bytes())
            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
    }

    /// Set an attribute, keeping the position of an existing one
    ///
    /// Only this element's start tag is re-serialized.
    pub fn set_attr(&mut self, key: &str, value: &str) {
        let existing: Vec<(Vec<u8>, Vec<u8>)> = self
            .start
            .attributes()
            .flatten()
            .map(|a| (a.key.as_ref().to_vec(), a.value.into_owned()))
            .collect();

        let mut start = BytesStart::new(self.name().to_string());
        let mut replaced = false;
        for (raw_key, raw_value) in &existing {
            if raw_key.as_slice() == key.as_bytes() {
                start.push_attribute((key, value));
                replaced = true;
            } else if raw_value.contains(&b'"') {
                // Single-quoted in the source; re-escape for double quotes
                let key = String::from_utf8_lossy(raw_key);
                let unescaped = quick_xml::escape::unescape(&String::from_utf8_lossy(raw_value))
                    .map(|v| v.into_owned())
                    .unwrap_or_default();
                start.push_attribute((key.as_ref(), unescaped.as_str()));
            } else {
                start.push_attribute(Attribute {
                    key: QName(raw_key),
                    value: Cow::Borrowed(raw_value.as_slice()),
                });
            }
        }
        if !replaced {
            start.push_attribute((key, value));
        }

        self.start = start;
    }

    /// All attributes as unescaped `(key, value)` pairs
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.start
            .attributes()
            .flatten()
            .filter_map(|a| {
                let key = std::str::from_utf8(a.key.as_ref()).ok()?.to_string();
                let value = a.unescape_value().ok()?.into_owned();
                Some((key, value))
            })
            .collect()
    }

    /// Child elements
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// Child elements with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children().filter(move |c| c.name() == name)
    }

    pub fn children_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> + 'a {
        self.children_mut().filter(move |c| c.name() == name)
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children().find(|c| c.name() == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children_mut().find(|c| c.name() == name)
    }

    /// Node index of the first child element with the given name
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|n| n.as_element().is_some_and(|e| e.name() == name))
    }

    /// Replace the element at a node index, returning the old one
    pub fn replace_child(&mut self, index: usize, element: Element) -> Option<Element> {
        match self.children.get_mut(index) {
            Some(Node::Element(old)) => Some(std::mem::replace(old, element)),
            _ => None,
        }
    }

    /// Remove the first child element with the given name
    pub fn remove_child(&mut self, name: &str) -> Option<Element> {
        let index = self.position_of(name)?;
        match self.children.remove(index) {
            Node::Element(element) => Some(element),
            Node::Other(_) => None,
        }
    }

    /// Append a child element
    pub fn append_child(&mut self, element: Element) {
        if self.end.is_none() {
            self.end = Some(BytesEnd::new(self.name().to_string()));
        }
        self.children.push(Node::Element(element));
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), DocumentError> {
        match &self.end {
            None if self.children.is_empty() => {
                write_event(writer, Event::Empty(self.start.clone()))?;
            }
            end => {
                write_event(writer, Event::Start(self.start.clone()))?;
                for child in &self.children {
                    child.write_to(writer)?;
                }
                let end = end
                    .clone()
                    .unwrap_or_else(|| BytesEnd::new(self.name().to_string()));
                write_event(writer, Event::End(end))?;
            }
        }
        Ok(())
    }
}

impl Node {
    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), DocumentError> {
        match self {
            Node::Element(element) => element.write_to(writer),
            Node::Other(event) => write_event(writer, event.clone()),
        }
    }
}

fn write_event<W: std::io::Write>(
    writer: &mut Writer<W>,
    event: Event<'_>,
) -> Result<(), DocumentError> {
    writer
        .write_event(event)
        .map_err(|e| DocumentError::Write(e.to_string()))
}

/// A parsed robot description
#[derive(Debug, Clone)]
pub struct UrdfDocument {
    nodes: Vec<Node>,
    /// Input started with a UTF-8 byte order mark
    bom: bool,
}

impl UrdfDocument {
    /// Parse a document from a string
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let (xml, bom) = match xml.strip_prefix(UTF8_BOM) {
            Some(rest) => (rest, true),
            None => (xml, false),
        };
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                DocumentError::Parse(format!("at byte {}: {}", reader.buffer_position(), e))
            })?;

            match event {
                Event::Start(start) => stack.push(Element {
                    start: start.into_owned(),
                    end: None,
                    children: Vec::new(),
                }),
                Event::Empty(start) => {
                    let element = Element {
                        start: start.into_owned(),
                        end: None,
                        children: Vec::new(),
                    };
                    attach(&mut stack, &mut nodes, Node::Element(element));
                }
                Event::End(end) => {
                    let mut element = stack.pop().ok_or_else(|| {
                        DocumentError::Parse(format!(
                            "unexpected closing tag at byte {}",
                            reader.buffer_position()
                        ))
                    })?;
                    element.end = Some(end.into_owned());
                    attach(&mut stack, &mut nodes, Node::Element(element));
                }
                Event::Eof => break,
                other => attach(&mut stack, &mut nodes, Node::Other(other.into_owned())),
            }
        }

        if let Some(open) = stack.last() {
            return Err(DocumentError::Parse(format!(
                "unclosed element <{}>",
                open.name()
            )));
        }

        let document = Self { nodes, bom };
        if document.root().is_none() {
            return Err(DocumentError::NoRoot);
        }
        Ok(document)
    }

    /// Read and parse a document from disk
    pub fn read(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DocumentError::Io(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Serialize the document
    pub fn to_xml_string(&self) -> Result<String, DocumentError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            node.write_to(&mut writer)?;
        }
        let body =
            String::from_utf8(writer.into_inner()).map_err(|e| DocumentError::Write(e.to_string()))?;
        Ok(if self.bom {
            format!("{}{}", UTF8_BOM, body)
        } else {
            body
        })
    }

    /// Serialize the document to disk
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let content = self.to_xml_string()?;
        std::fs::write(path, content)
            .map_err(|e| DocumentError::Io(format!("{}: {}", path.display(), e)))
    }

    /// Root element (`<robot>` for URDF, `<sdf>` for SDF)
    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(Node::as_element)
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(Node::as_element_mut)
    }

    /// Top-level `<link>` elements
    pub fn links(&self) -> impl Iterator<Item = &Element> {
        self.root()
            .into_iter()
            .flat_map(|root| root.children_named("link"))
    }

    pub fn links_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.root_mut()
            .into_iter()
            .flat_map(|root| root.children_named_mut("link"))
    }

    /// Top-level `<joint>` elements
    pub fn joints(&self) -> impl Iterator<Item = &Element> {
        self.root()
            .into_iter()
            .flat_map(|root| root.children_named("joint"))
    }

    pub fn joints_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.root_mut()
            .into_iter()
            .flat_map(|root| root.children_named_mut("joint"))
    }
}

fn attach(stack: &mut [Element], nodes: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => nodes.push(node),
    }
}

/// Document errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("XML parse error: {0}")]
    Parse(String),
    #[error("XML write error: {0}")]
    Write(String),
    #[error("Document has no root element")]
    NoRoot,
}
