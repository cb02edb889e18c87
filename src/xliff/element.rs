//! Opaque XML elements carried through a read/write cycle without interpretation.
//!
//! Used for `context-group`, `note` and any other child the sync does not act on.

use std::io::Write;

use quick_xml::events::{
    BytesCData,
    BytesEnd,
    BytesStart,
    BytesText,
    Event,
};
use quick_xml::{
    Reader,
    Writer,
};

use super::XliffError;

/// Attribute list in document order, values unescaped.
pub type Attributes = Vec<(String, String)>;

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data, kept escaped as found in the document.
    Text(String),
    CData(String),
}

/// An XML element kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Attributes,
    pub children: Vec<Node>,
}

impl Element {
    /// Builds a childless element from its start tag.
    pub(crate) fn from_empty(start: &BytesStart<'_>) -> Result<Self, XliffError> {
        Ok(Self { name: element_name(start)?, attributes: read_attributes(start)?, children: Vec::new() })
    }

    /// Reads the element opened by `start`, consuming events up to its end tag.
    pub(crate) fn read(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Self, XliffError> {
        let mut element = Self::from_empty(start)?;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    element.children.push(Node::Element(Self::read(reader, &e)?));
                }
                Event::Empty(e) => element.children.push(Node::Element(Self::from_empty(&e)?)),
                Event::Text(e) => {
                    element.children.push(Node::Text(std::str::from_utf8(&e)?.to_string()));
                }
                Event::CData(e) => {
                    element.children.push(Node::CData(std::str::from_utf8(&e)?.to_string()));
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XliffError::Structure(format!(
                        "unexpected end of document inside <{}>",
                        element.name
                    )));
                }
                _ => {}
            }
        }

        // indentation only; the writer re-indents
        if element.children.iter().any(|child| matches!(child, Node::Element(_))) {
            element
                .children
                .retain(|child| !matches!(child, Node::Text(text) if text.trim().is_empty()));
        }

        Ok(element)
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), XliffError> {
        let start = start_tag(&self.name, &self.attributes);
        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write(writer)?,
                Node::Text(text) => writer.write_event(Event::Text(BytesText::from_escaped(text.as_str())))?,
                Node::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str())))?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

pub(crate) fn element_name(start: &BytesStart<'_>) -> Result<String, XliffError> {
    Ok(std::str::from_utf8(start.name().as_ref())?.to_string())
}

pub(crate) fn read_attributes(start: &BytesStart<'_>) -> Result<Attributes, XliffError> {
    let mut attributes = Attributes::new();
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = std::str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

pub(crate) fn start_tag<'a>(name: &'a str, attributes: &'a Attributes) -> BytesStart<'a> {
    BytesStart::new(name)
        .with_attributes(attributes.iter().map(|(key, value)| (key.as_str(), value.as_str())))
}

pub(crate) fn attribute<'a>(attributes: &'a Attributes, key: &str) -> Option<&'a str> {
    attributes.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
}
