use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::{Element, Node, XmlError, XmlResult};

/// ## Summary
/// Serializes an element tree to a UTF-8 document with an XML declaration.
///
/// ## Errors
/// Returns an error if XML writing fails.
pub fn serialize_document(root: &Element) -> XmlResult<String> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(|e| XmlError::Write(e.to_string()))?;
    write_element(&mut writer, root)?;

    String::from_utf8(writer.into_inner()).map_err(|e| {
        tracing::error!("Generated invalid UTF-8 in XML output: {}", e);
        XmlError::Write(e.to_string())
    })
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, elem: &Element) -> XmlResult<()> {
    let mut start = BytesStart::new(elem.name.as_str());
    for (key, value) in &elem.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if elem.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| XmlError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| XmlError::Write(e.to_string()))?;

    for child in &elem.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(t) => writer
                .write_event(Event::Text(BytesText::new(t)))
                .map_err(|e| XmlError::Write(e.to_string()))?,
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(elem.name.as_str())))
        .map_err(|e| XmlError::Write(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::xml::parse_document;

    #[test]
    fn writes_declaration_attributes_and_escaped_text() {
        let doc = Element::new("d:multistatus")
            .with_attr("xmlns:d", "DAV:")
            .with_child(Element::new("d:href").with_text("/dav/a&b/"))
            .with_child(Element::new("d:getetag"));

        let xml = serialize_document(&doc).expect("serialize");
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(xml.contains(r#"<d:multistatus xmlns:d="DAV:">"#));
        assert!(xml.contains("<d:href>/dav/a&amp;b/</d:href>"));
        assert!(xml.contains("<d:getetag/>"));
    }

    #[test]
    fn written_tree_parses_back() {
        let doc = Element::new("d:prop")
            .with_attr("xmlns:d", "DAV:")
            .with_child(Element::new("d:displayname").with_text("Tom & Jerry"));

        let xml = serialize_document(&doc).expect("serialize");
        let parsed = parse_document(&xml).expect("parse");
        assert_eq!(
            parsed.child("displayname").map(Element::text),
            Some("Tom & Jerry".into())
        );
    }
}
