//! Calendar-query filter parsing.

use super::error::{ParseError, ParseResult};
use crate::rfc::dav::core::{
    Collation, CompFilter, FilterTest, MatchType, ParamFilter, PropFilter, TextMatch, TimeRange,
};
use crate::rfc::ical::core::parse_utc_timestamp;
use crate::rfc::xml::Element;

/// ## Summary
/// Builds the filter tree from a request body.
///
/// `root` may be the `<calendar-query>` element or the `<filter>` element
/// itself. Elements are matched by local name regardless of prefix.
///
/// Returns `Ok(None)` when there is no `<filter>` or it holds no
/// `<comp-filter>`; a missing filter matches everything.
///
/// ## Errors
/// Returns an error if a filter node lacks its `name` attribute or a
/// `<text-match>` names an unsupported collation or match type.
#[tracing::instrument(skip_all)]
pub fn parse_filter(root: &Element) -> ParseResult<Option<CompFilter>> {
    let Some(filter) = root.find("filter") else {
        tracing::debug!("Request carries no filter");
        return Ok(None);
    };

    let Some(comp) = filter.child("comp-filter") else {
        tracing::debug!("Filter is empty");
        return Ok(None);
    };

    parse_comp_filter(comp).map(Some)
}

fn required_name(elem: &Element) -> ParseResult<String> {
    elem.attr("name")
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ParseError::missing_attribute("name"))
}

fn has_not_defined(elem: &Element) -> bool {
    elem.child("is-not-defined").is_some()
}

fn parse_comp_filter(elem: &Element) -> ParseResult<CompFilter> {
    let mut node = CompFilter::new(required_name(elem)?);
    node.test = FilterTest::parse(elem.attr("test"));

    if has_not_defined(elem) {
        return Ok(node.not_defined());
    }

    for child in elem.elements() {
        match child.local_name() {
            "time-range" => node.time_range = Some(parse_time_range(child)),
            "prop-filter" => node.prop_filters.push(parse_prop_filter(child)?),
            "comp-filter" => node.comp_filters.push(parse_comp_filter(child)?),
            other => tracing::trace!(element = other, "Ignoring unknown comp-filter child"),
        }
    }

    Ok(node)
}

fn parse_prop_filter(elem: &Element) -> ParseResult<PropFilter> {
    let mut node = PropFilter::new(required_name(elem)?);
    node.test = FilterTest::parse(elem.attr("test"));

    if has_not_defined(elem) {
        return Ok(node.not_defined());
    }

    for child in elem.elements() {
        match child.local_name() {
            "time-range" => node.time_range = Some(parse_time_range(child)),
            "text-match" => node.text_match = Some(parse_text_match(child)?),
            "param-filter" => node.param_filters.push(parse_param_filter(child)?),
            other => tracing::trace!(element = other, "Ignoring unknown prop-filter child"),
        }
    }

    Ok(node)
}

fn parse_param_filter(elem: &Element) -> ParseResult<ParamFilter> {
    let mut node = ParamFilter::new(required_name(elem)?);

    if has_not_defined(elem) {
        node.is_not_defined = true;
        return Ok(node);
    }

    if let Some(text_match) = elem.child("text-match") {
        node.text_match = Some(parse_text_match(text_match)?);
    }

    Ok(node)
}

fn parse_text_match(elem: &Element) -> ParseResult<TextMatch> {
    let collation = match elem.attr("collation") {
        Some(name) => Collation::parse(name).ok_or_else(|| ParseError::unsupported_collation(name))?,
        None => Collation::default(),
    };

    let match_type = match elem.attr("match-type") {
        Some(name) => MatchType::parse(name)
            .ok_or_else(|| ParseError::invalid_value(format!("invalid match-type: {name}")))?,
        None => MatchType::default(),
    };

    let negate = elem
        .attr("negate-condition")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("yes"));

    Ok(TextMatch {
        collation,
        match_type,
        negate,
        value: elem.text(),
    })
}

/// Reads `start`/`end`; a malformed bound is treated as absent.
fn parse_time_range(elem: &Element) -> TimeRange {
    let bound = |attr: &str| {
        let raw = elem.attr(attr)?;
        let parsed = parse_utc_timestamp(raw);
        if parsed.is_none() {
            tracing::debug!(attr, value = raw, "Malformed time-range bound, treating as unbounded");
        }
        parsed
    };

    TimeRange::new(bound("start"), bound("end"))
}
