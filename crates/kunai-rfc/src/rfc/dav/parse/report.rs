//! REPORT body parsing.

use super::error::{ParseError, ParseResult};
use super::filter::parse_filter;
use super::propfind::parse_prop_selection;
use crate::rfc::dav::core::{CalendarMultiget, CalendarQuery, ReportRequest};
use crate::rfc::xml::parse_document;

/// ## Summary
/// Parses a REPORT request body.
///
/// `<calendar-query>` and `<calendar-multiget>` are understood. A missing
/// property selection defaults to `allprop`.
///
/// ## Errors
/// Returns an error if the body is not well-formed XML, names an unsupported
/// report, or carries a malformed filter.
#[tracing::instrument(skip(body), fields(body_len = body.len()))]
pub fn parse_report(body: &str) -> ParseResult<ReportRequest> {
    let root = parse_document(body)?;
    let props = parse_prop_selection(&root)?.unwrap_or_default();

    match root.local_name() {
        "calendar-query" => {
            let filter = parse_filter(&root)?;
            Ok(ReportRequest::CalendarQuery(CalendarQuery { props, filter }))
        }
        "calendar-multiget" => {
            let hrefs: Vec<String> = root
                .children_named("href")
                .map(|h| h.text().trim().to_string())
                .filter(|h| !h.is_empty())
                .collect();
            tracing::debug!(count = hrefs.len(), "Parsed calendar-multiget hrefs");
            Ok(ReportRequest::CalendarMultiget(CalendarMultiget { props, hrefs }))
        }
        other => {
            tracing::warn!(report = other, "Unsupported REPORT requested");
            Err(ParseError::unsupported_report(other))
        }
    }
}
