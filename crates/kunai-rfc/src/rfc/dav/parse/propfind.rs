//! PROPFIND body parsing.

use super::error::{ParseError, ParseResult};
use crate::rfc::dav::core::{Namespace, PropfindRequest, QName};
use crate::rfc::xml::{Element, parse_document};

/// ## Summary
/// Parses a PROPFIND request body.
///
/// An empty body is `allprop` (RFC 4918 §9.1).
///
/// ## Errors
/// Returns an error if the body is not well-formed XML or is not a
/// `<propfind>` with one of `<prop>`, `<propname>` or `<allprop>`.
#[tracing::instrument(skip(body), fields(body_len = body.len()))]
pub fn parse_propfind(body: &str) -> ParseResult<PropfindRequest> {
    if body.trim().is_empty() {
        tracing::debug!("Empty PROPFIND body, treating as allprop");
        return Ok(PropfindRequest::allprop());
    }

    let root = parse_document(body)?;
    if root.local_name() != "propfind" {
        return Err(ParseError::unexpected_element(root.local_name()));
    }

    parse_prop_selection(&root)?.ok_or_else(|| ParseError::missing_element("prop"))
}

/// ## Summary
/// Reads the property selection under `parent`.
///
/// Returns `None` if `parent` holds none of `<prop>`, `<propname>` or
/// `<allprop>`.
///
/// ## Errors
/// Returns an error if a requested name is malformed.
pub(crate) fn parse_prop_selection(parent: &Element) -> ParseResult<Option<PropfindRequest>> {
    if let Some(prop) = parent.child("prop") {
        return Ok(Some(PropfindRequest::Prop(qnames_of(prop))));
    }

    if parent.child("propname").is_some() {
        return Ok(Some(PropfindRequest::PropName));
    }

    if parent.child("allprop").is_some() {
        let include = parent.child("include").map(qnames_of).unwrap_or_default();
        return Ok(Some(PropfindRequest::AllProp { include }));
    }

    Ok(None)
}

/// Child element names as qualified names. Unqualified names fall back to `DAV:`.
fn qnames_of(parent: &Element) -> Vec<QName> {
    parent
        .elements()
        .map(|e| {
            let namespace = e
                .namespace
                .clone()
                .map_or(Namespace::DAV, Namespace::from);
            QName::new(namespace, e.local_name().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_allprop() {
        assert_eq!(parse_propfind("").expect("parse"), PropfindRequest::allprop());
        assert_eq!(parse_propfind("  \r\n").expect("parse"), PropfindRequest::allprop());
    }

    #[test]
    fn prop_keeps_request_namespaces() {
        let req = parse_propfind(
            r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav" xmlns:x="urn:example">
  <d:prop>
    <d:displayname/>
    <c:calendar-home-set/>
    <x:shoe-size/>
  </d:prop>
</d:propfind>"#,
        )
        .expect("parse");

        let PropfindRequest::Prop(names) = req else {
            panic!("expected prop request");
        };
        assert_eq!(names.len(), 3);
        assert_eq!(names[0], QName::dav("displayname"));
        assert_eq!(names[1], QName::caldav("calendar-home-set"));
        assert_eq!(names[2].namespace_uri(), "urn:example");
        assert_eq!(names[2].local_name(), "shoe-size");
    }

    #[test]
    fn propname_and_allprop_with_include() {
        assert_eq!(
            parse_propfind(r#"<propfind xmlns="DAV:"><propname/></propfind>"#).expect("parse"),
            PropfindRequest::PropName
        );

        let req = parse_propfind(
            r#"<D:propfind xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:allprop/>
  <D:include><C:calendar-data/></D:include>
</D:propfind>"#,
        )
        .expect("parse");
        assert_eq!(
            req,
            PropfindRequest::AllProp {
                include: vec![QName::caldav("calendar-data")]
            }
        );
    }

    #[test]
    fn rejects_other_roots_and_empty_propfind() {
        assert!(parse_propfind(r#"<D:prop xmlns:D="DAV:"/>"#).is_err());
        assert!(parse_propfind(r#"<D:propfind xmlns:D="DAV:"/>"#).is_err());
        assert!(parse_propfind("<D:propfind").is_err());
    }
}
