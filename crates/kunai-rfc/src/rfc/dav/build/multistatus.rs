//! Per-resource `207 Multi-Status` documents (RFC 4918 §13).

use std::collections::BTreeMap;

use crate::rfc::dav::core::{Namespace, PropertyMap, QName, ResolvedProperty, Status};
use crate::rfc::xml::Element;

/// ## Summary
/// Creates a `<d:multistatus>` root declaring every known namespace prefix.
#[must_use]
pub fn empty_multistatus() -> Element {
    Namespace::KNOWN
        .iter()
        .fold(Element::new("d:multistatus"), |root, ns| match ns.prefix() {
            Some(prefix) => root.with_attr(format!("xmlns:{prefix}"), ns.as_str()),
            None => root,
        })
}

/// ## Summary
/// Builds a multistatus document with one `<d:response>` for `href`.
///
/// Properties are grouped into one `<d:propstat>` per status, ordered
/// 200, 404, 403, 500, 400. Only non-empty groups are emitted. Failed
/// properties are written as empty elements.
#[must_use]
pub fn build_response(href: &str, props: &PropertyMap) -> Element {
    let mut groups: BTreeMap<Status, Vec<&ResolvedProperty>> = BTreeMap::new();
    for entry in props.iter() {
        groups.entry(entry.status()).or_default().push(entry);
    }

    let response = groups.into_iter().fold(response_for(href), |response, (status, entries)| {
        let prop = entries
            .into_iter()
            .fold(Element::new("d:prop"), |prop, entry| {
                prop.with_child(property_element(entry))
            });
        response.with_child(propstat(prop, status))
    });

    empty_multistatus().with_child(response)
}

/// ## Summary
/// Builds a `propname` answer: every name as an empty element under 200.
#[must_use]
pub fn build_propname_response(href: &str, names: &[QName]) -> Element {
    let prop = names
        .iter()
        .fold(Element::new("d:prop"), |prop, name| prop.with_child(empty_property(name)));

    let mut response = response_for(href);
    if !names.is_empty() {
        response.push(propstat(prop, Status::Ok));
    }

    empty_multistatus().with_child(response)
}

/// ## Summary
/// Builds a response that carries only a status for `href`.
#[must_use]
pub fn build_status_response(href: &str, status: Status) -> Element {
    empty_multistatus().with_child(
        response_for(href).with_child(Element::new("d:status").with_text(status.status_line())),
    )
}

fn response_for(href: &str) -> Element {
    Element::new("d:response").with_child(Element::new("d:href").with_text(href))
}

fn propstat(prop: Element, status: Status) -> Element {
    Element::new("d:propstat")
        .with_child(prop)
        .with_child(Element::new("d:status").with_text(status.status_line()))
}

fn property_element(entry: &ResolvedProperty) -> Element {
    match &entry.outcome {
        Ok(value) => value.to_element(),
        Err(_) => empty_property(&entry.name),
    }
}

fn empty_property(name: &QName) -> Element {
    let elem = Element::new(name.tag());
    if name.needs_local_declaration() {
        elem.with_attr("xmlns", name.namespace_uri())
    } else {
        elem
    }
}
