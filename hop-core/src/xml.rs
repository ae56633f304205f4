//! Minimal XML element tree
//!
//! Hop exchanges XML in both directions: pipeline and workflow definitions are
//! re-embedded in registration payloads, and every servlet answers with an XML
//! envelope. Both sides only need an owned tree with ordered children, so this
//! module wraps `quick-xml` events into [`Element`] values.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{CoreError, Result};

/// A child of an element: either a nested element or character data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and ordered children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates an element holding a single text node
    ///
    /// An empty `text` produces an empty element (`<name/>`).
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        let text = text.into();
        if !text.is_empty() {
            element.children.push(Node::Text(text));
        }
        element
    }

    /// Appends a child element
    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Builder-style variant of [`Element::push`]
    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Iterates over child elements, skipping text
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Iterates over child elements with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |element| element.name == name)
    }

    /// Returns the first child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// Concatenated character data of this element (not of descendants)
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Text of the first child with the given name, if that child exists
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(Element::text)
    }

    /// Text of a mandatory child element
    pub fn require_child_text(&self, name: &str) -> Result<String> {
        self.child_text(name)
            .ok_or_else(|| CoreError::missing_field(&self.name, name))
    }

    /// Parses a complete document and returns its root element
    ///
    /// Declarations, comments and processing instructions are dropped.
    /// Whitespace-only text between child elements is discarded so that
    /// indented documents compare equal to compact ones.
    pub fn parse(input: &[u8]) -> Result<Element> {
        let mut reader = Reader::from_reader(input);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader
                .read_event_into(&mut buf)
                .map_err(CoreError::malformed)?
            {
                Event::Start(start) => stack.push(Self::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Self::from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| CoreError::malformed("unexpected closing tag"))?;
                    element.drop_layout_whitespace();
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = text.unescape().map_err(CoreError::malformed)?;
                        parent.children.push(Node::Text(text.into_owned()));
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8(data.into_inner().into_owned())
                            .map_err(CoreError::malformed)?;
                        parent.children.push(Node::Text(text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(CoreError::malformed(format!("unclosed element <{}>", open.name)));
        }
        root.ok_or_else(|| CoreError::malformed("document has no root element"))
    }

    /// Serializes the element as a UTF-8 document with an XML declaration
    pub fn to_document(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;
        self.write_to(&mut writer)?;
        Ok(writer.into_inner())
    }

    fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start)).map_err(write_error)?;
            return Ok(());
        }

        writer.write_event(Event::Start(start)).map_err(write_error)?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_to(writer)?,
                Node::Text(text) => writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(write_error)?,
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(write_error)?;
        Ok(())
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Element> {
        let name = String::from_utf8(start.name().as_ref().to_vec()).map_err(CoreError::malformed)?;
        let mut element = Element::new(name);
        for attribute in start.attributes() {
            let attribute = attribute.map_err(CoreError::malformed)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(CoreError::malformed)?
                .into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    fn drop_layout_whitespace(&mut self) {
        let has_elements = self
            .children
            .iter()
            .any(|node| matches!(node, Node::Element(_)));
        if has_elements {
            self.children.retain(|node| match node {
                Node::Text(text) => !text.trim().is_empty(),
                Node::Element(_) => true,
            });
        }
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(CoreError::malformed("document has more than one root element"));
    }
    *root = Some(element);
    Ok(())
}

fn write_error(err: impl std::fmt::Display) -> CoreError {
    CoreError::Write(err.to_string())
}
