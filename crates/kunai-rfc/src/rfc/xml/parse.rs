use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{Element, Node, XmlError, XmlResult};

/// ## Summary
/// Parses an XML document into an owned element tree.
///
/// Each element's `namespace` is resolved against the `xmlns` declarations in
/// scope. Whitespace-only text between elements is dropped; other text is kept
/// verbatim with entity and character references expanded.
///
/// ## Errors
/// Returns an error if the document is not well-formed, has no root element,
/// or uses an undeclared prefix.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse_document(input: &str) -> XmlResult<Element> {
    let mut reader = Reader::from_str(input);

    let mut stack: Vec<Element> = Vec::new();
    let mut scopes: Vec<Vec<(String, String)>> = Vec::new();
    let mut pending = String::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                flush_text(&mut stack, &mut pending);
                let (elem, decls) = open_element(&e, &scopes)?;
                scopes.push(decls);
                stack.push(elem);
            }
            Event::Empty(e) => {
                flush_text(&mut stack, &mut pending);
                let (elem, _) = open_element(&e, &scopes)?;
                attach(&mut stack, &mut root, elem)?;
            }
            Event::End(_) => {
                flush_text(&mut stack, &mut pending);
                scopes.pop();
                let elem = stack
                    .pop()
                    .ok_or_else(|| XmlError::Malformed("unbalanced end tag".into()))?;
                attach(&mut stack, &mut root, elem)?;
            }
            Event::Text(e) => {
                let raw = reader.decoder().decode(&e)?;
                pending.push_str(&quick_xml::escape::unescape(&raw)?);
            }
            Event::CData(e) => {
                pending.push_str(std::str::from_utf8(&e)?);
            }
            Event::GeneralRef(r) => {
                let name = reader.decoder().decode(&r)?;
                pending.push_str(&resolve_reference(&name)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(XmlError::Malformed("unclosed element at end of input".into()));
    }

    root.ok_or(XmlError::EmptyDocument)
}

fn flush_text(stack: &mut [Element], pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let text = std::mem::take(pending);
    if text.trim().is_empty() {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Text(text));
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, elem: Element) -> XmlResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(elem));
        Ok(())
    } else if root.is_none() {
        *root = Some(elem);
        Ok(())
    } else {
        Err(XmlError::Malformed("multiple root elements".into()))
    }
}

/// Builds an element from a start tag and returns the declarations it opens.
fn open_element(
    start: &BytesStart<'_>,
    scopes: &[Vec<(String, String)>],
) -> XmlResult<(Element, Vec<(String, String)>)> {
    let name = std::str::from_utf8(start.name().as_ref())?.to_string();

    let mut attributes = Vec::new();
    let mut decls = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let raw = std::str::from_utf8(&attr.value)?;
        let value = quick_xml::escape::unescape(raw)?.into_owned();

        if key == "xmlns" {
            decls.push((String::new(), value.clone()));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            decls.push((prefix.to_string(), value.clone()));
        }
        attributes.push((key, value));
    }

    let prefix = name.split_once(':').map_or("", |(p, _)| p);
    let namespace = lookup_namespace(prefix, &decls, scopes);
    if namespace.is_none() && !prefix.is_empty() {
        return Err(XmlError::UnboundPrefix(prefix.to_string()));
    }

    Ok((
        Element {
            name,
            namespace,
            attributes,
            children: Vec::new(),
        },
        decls,
    ))
}

fn lookup_namespace(
    prefix: &str,
    own: &[(String, String)],
    scopes: &[Vec<(String, String)>],
) -> Option<String> {
    std::iter::once(own)
        .chain(scopes.iter().rev().map(Vec::as_slice))
        .find_map(|decls| decls.iter().find(|(p, _)| p == prefix))
        .map(|(_, uri)| uri.clone())
        .filter(|uri| !uri.is_empty())
}

fn resolve_reference(name: &str) -> XmlResult<String> {
    let predefined = match name {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        _ => None,
    };
    if let Some(s) = predefined {
        return Ok(s.to_string());
    }

    let code = if let Some(hex) = name.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };

    code.and_then(char::from_u32)
        .map(String::from)
        .ok_or_else(|| XmlError::Malformed(format!("unknown entity reference: &{name};")))
}
