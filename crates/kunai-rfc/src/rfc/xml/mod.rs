//! Owned, namespace-aware XML element tree.
//!
//! Requests are parsed into an [`Element`] tree whose elements carry the
//! namespace URI resolved at parse time. Responses are built as trees and
//! serialized with their `xmlns` declarations kept as ordinary attributes, so
//! the tree can be merged and re-serialized without losing prefixes.

mod parse;
mod write;

pub use parse::parse_document;
pub use write::serialize_document;

use thiserror::Error;

/// Errors produced while reading or writing XML.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Malformed(String),

    #[error("XML document has no root element")]
    EmptyDocument,

    #[error("unbound namespace prefix: {0}")]
    UnboundPrefix(String),

    #[error("XML write error: {0}")]
    Write(String),
}

impl From<quick_xml::Error> for XmlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<quick_xml::encoding::EncodingError> for XmlError {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for XmlError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<std::str::Utf8Error> for XmlError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

pub type XmlResult<T> = Result<T, XmlError>;

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Tag as written, including any prefix (`d:href`).
    pub name: String,
    /// Namespace URI the tag resolved to, when known.
    pub namespace: Option<String>,
    /// Attributes in document order; `xmlns` declarations included.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates an element that carries its own resolved namespace.
    #[must_use]
    pub fn qualified(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Sets an attribute, replacing an existing one with the same name.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    /// Returns the tag without its prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Returns the tag prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the `xmlns` declarations on this element as `(prefix, uri)`.
    ///
    /// The default namespace is reported with an empty prefix.
    #[must_use]
    pub fn namespace_declarations(&self) -> Vec<(&str, &str)> {
        self.attributes
            .iter()
            .filter_map(|(k, v)| {
                if k == "xmlns" {
                    Some(("", v.as_str()))
                } else {
                    k.strip_prefix("xmlns:").map(|p| (p, v.as_str()))
                }
            })
            .collect()
    }

    /// Iterates over child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Returns the first child element with the given local name, ignoring prefixes.
    #[must_use]
    pub fn child(&self, local_name: &str) -> Option<&Element> {
        self.elements().find(|e| e.local_name() == local_name)
    }

    /// Iterates over child elements with the given local name, ignoring prefixes.
    pub fn children_named<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.local_name() == local_name)
    }

    /// Depth-first search for the first descendant (or self) with the given local name.
    #[must_use]
    pub fn find(&self, local_name: &str) -> Option<&Element> {
        if self.local_name() == local_name {
            return Some(self);
        }
        self.elements().find_map(|e| e.find(local_name))
    }

    /// Concatenates the direct text children.
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_name_ignores_prefix() {
        let elem = Element::new("C:comp-filter");
        assert_eq!(elem.local_name(), "comp-filter");
        assert_eq!(elem.prefix(), Some("C"));

        let bare = Element::new("href");
        assert_eq!(bare.local_name(), "href");
        assert_eq!(bare.prefix(), None);
    }

    #[test]
    fn child_lookup_is_prefix_agnostic() {
        let root = Element::new("x:prop")
            .with_child(Element::new("y:getetag"))
            .with_child(Element::new("displayname").with_text("Work"));

        assert!(root.child("getetag").is_some());
        assert_eq!(root.child("displayname").map(Element::text), Some("Work".into()));
        assert!(root.child("owner").is_none());
    }

    #[test]
    fn namespace_declarations_include_default() {
        let elem = Element::new("multistatus")
            .with_attr("xmlns", "DAV:")
            .with_attr("xmlns:cal", "urn:ietf:params:xml:ns:caldav")
            .with_attr("name", "x");

        assert_eq!(
            elem.namespace_declarations(),
            vec![("", "DAV:"), ("cal", "urn:ietf:params:xml:ns:caldav")]
        );
    }

    #[test]
    fn set_attr_replaces() {
        let mut elem = Element::new("a").with_attr("k", "1");
        elem.set_attr("k", "2");
        assert_eq!(elem.attributes, vec![("k".to_string(), "2".to_string())]);
    }
}
