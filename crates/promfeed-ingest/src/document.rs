//! Read-only element tree for feed documents.
//!
//! Feeds are small enough (tens of thousands of offers) to hold in memory, and
//! a tree lets the extractor try several document shapes against the same
//! parse. Element and attribute names are stored by local name, so namespace
//! prefixes never affect lookups.

use std::borrow::Cow;

use promfeed_core::xml_safe;
use quick_xml::encoding::Decoder;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::FeedError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Direct text and CDATA content, unescaped and concatenated. Not trimmed.
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Returns the raw value of the first attribute named `name`.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the first direct child named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Iterates over direct children named `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text of the first direct child named `name`, if that text is
    /// non-empty.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(XmlElement::trimmed_text)
            .filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Collects this element and every descendant named `name`, pre-order.
    #[must_use]
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        let mut pending = vec![self];
        while let Some(element) = pending.pop() {
            if element.name == name {
                found.push(element);
            }
            // Reverse so the leftmost child is visited first.
            pending.extend(element.children.iter().rev());
        }
        found
    }
}

/// A parsed feed. The tree is never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDocument {
    root: XmlElement,
}

impl FeedDocument {
    /// Parses an XML document into an element tree.
    ///
    /// Text is decoded using the encoding named in the XML declaration
    /// (UTF-8 when there is none), so `windows-1251` feeds come out as proper
    /// Cyrillic. Unknown entities in text or attribute values (common in
    /// scraped product descriptions) are kept verbatim instead of failing the
    /// feed. Characters that XML 1.0 cannot carry, such as `&#11;` or a raw
    /// form feed, are dropped so re-serialized output stays well-formed.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Xml`] / [`FeedError::Attr`] for syntax errors such as
    ///   mismatched end tags.
    /// - [`FeedError::Malformed`] if there is no root element, more than one
    ///   root element, an element is left unclosed, or text is not valid in
    ///   the declared encoding.
    pub fn parse(bytes: &[u8]) -> Result<Self, FeedError> {
        let mut reader = Reader::from_reader(bytes);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(element_from_start(&start, reader.decoder())?),
                Event::Empty(start) => {
                    let element = element_from_start(&start, reader.decoder())?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| FeedError::Malformed {
                        reason: "closing tag without an open element".to_string(),
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        let decoded = decode(reader.decoder(), &text)?;
                        current.text.push_str(&xml_safe(&unescape_or_keep(&decoded)));
                    }
                }
                Event::CData(cdata) => {
                    if let Some(current) = stack.last_mut() {
                        let decoded = decode(reader.decoder(), &cdata)?;
                        current.text.push_str(&xml_safe(&decoded));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(FeedError::Malformed {
                reason: format!("element <{}> is never closed", open.name),
            });
        }

        root.map(|root| Self { root })
            .ok_or_else(|| FeedError::Malformed {
                reason: "document has no root element".to_string(),
            })
    }

    #[must_use]
    pub fn root(&self) -> &XmlElement {
        &self.root
    }
}

fn element_from_start(start: &BytesStart<'_>, decoder: Decoder) -> Result<XmlElement, FeedError> {
    let name = decode(decoder, start.local_name().as_ref())?.into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = decode(decoder, attr.key.local_name().as_ref())?.into_owned();
        let raw = decode(decoder, &attr.value)?;
        let value = xml_safe(&unescape_or_keep(&raw)).into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn decode<'b>(decoder: Decoder, bytes: &'b [u8]) -> Result<Cow<'b, str>, FeedError> {
    decoder.decode(bytes).map_err(|e| FeedError::Malformed {
        reason: format!("text is not valid in the declared encoding: {e}"),
    })
}

/// Resolves entity references; text with an unknown entity is kept as is.
fn unescape_or_keep(text: &str) -> Cow<'_, str> {
    unescape(text).unwrap_or(Cow::Borrowed(text))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), FeedError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(FeedError::Malformed {
            reason: format!("second root element <{}>", element.name),
        });
    }
    *root = Some(element);
    Ok(())
}
