use super::error::{ParseError, ParseResult};
use crate::rfc::dav::core::MkcalendarRequest;
use crate::rfc::ical::core::ComponentKind;
use crate::rfc::xml::parse_document;

/// ## Summary
/// Parses a MKCALENDAR request body.
///
/// An empty body creates a calendar with default properties. Properties are
/// read from every `<set><prop>` block; unknown ones are ignored.
///
/// ## Errors
/// Returns an error if the body is not well-formed XML, is not an
/// `<mkcalendar>`, or names an unknown component kind.
#[tracing::instrument(skip(body), fields(body_len = body.len()))]
pub fn parse_mkcalendar(body: &str) -> ParseResult<MkcalendarRequest> {
    let mut request = MkcalendarRequest::default();
    if body.trim().is_empty() {
        return Ok(request);
    }

    let root = parse_document(body)?;
    if root.local_name() != "mkcalendar" {
        return Err(ParseError::unexpected_element(root.local_name()));
    }

    for prop in root
        .children_named("set")
        .flat_map(|set| set.children_named("prop"))
    {
        for elem in prop.elements() {
            match elem.local_name() {
                "displayname" => request.display_name = Some(elem.text()),
                "calendar-description" => request.description = Some(elem.text()),
                "calendar-timezone" => request.timezone = Some(elem.text()),
                "calendar-color" | "color" => request.color = Some(elem.text().trim().to_string()),
                "supported-calendar-component-set" => {
                    request.components = elem
                        .children_named("comp")
                        .map(|comp| {
                            let name = comp
                                .attr("name")
                                .ok_or_else(|| ParseError::missing_attribute("name"))?;
                            ComponentKind::parse(name).ok_or_else(|| {
                                ParseError::invalid_value(format!("unknown component: {name}"))
                            })
                        })
                        .collect::<ParseResult<_>>()?;
                }
                other => tracing::debug!(property = other, "Ignoring MKCALENDAR property"),
            }
        }
    }

    Ok(request)
}
