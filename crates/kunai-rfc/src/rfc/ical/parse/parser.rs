//! Document parser: nests content lines into components.

use super::error::{ICalParseError, ICalParseErrorKind, ICalParseResult};
use super::lexer::{parse_content_line, split_lines};
use crate::rfc::ical::core::Component;

/// ## Summary
/// Parses an iCalendar document into its root component.
///
/// The document must be exactly one component, normally `VCALENDAR`.
/// `BEGIN`/`END` names are matched case-insensitively.
///
/// ## Errors
/// Returns an error if a line is malformed, the document does not start with
/// `BEGIN`, components do not nest, or anything follows the root's `END`.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse_icalendar(input: &str) -> ICalParseResult<Component> {
    let lines = split_lines(input);
    let mut lines = lines.into_iter();

    let Some((first_num, first)) = lines.next() else {
        return Err(ICalParseError::new(ICalParseErrorKind::EmptyInput, 1));
    };
    let first = parse_content_line(&first, first_num)?;
    if first.name != "BEGIN" {
        return Err(ICalParseError::new(ICalParseErrorKind::MissingBegin, first_num)
            .with_context(first.name));
    }

    let mut stack = vec![Component::named(first.value.trim())];
    let mut last_line = first_num;

    while let Some((line_num, line)) = lines.next() {
        last_line = line_num;
        let prop = parse_content_line(&line, line_num)?;

        match prop.name.as_str() {
            "BEGIN" => stack.push(Component::named(prop.value.trim())),
            "END" => {
                let Some(done) = stack.pop() else {
                    return Err(ICalParseError::new(ICalParseErrorKind::TrailingContent, line_num));
                };
                if !done.name.eq_ignore_ascii_case(prop.value.trim()) {
                    return Err(ICalParseError::new(
                        ICalParseErrorKind::MismatchedComponent,
                        line_num,
                    )
                    .with_context(format!("expected END:{}, found END:{}", done.name, prop.value)));
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(done),
                    None => return finish(done, lines.next()),
                }
            }
            _ => match stack.last_mut() {
                Some(current) => current.properties.push(prop),
                None => {
                    return Err(ICalParseError::new(
                        ICalParseErrorKind::TrailingContent,
                        line_num,
                    ));
                }
            },
        }
    }

    Err(ICalParseError::new(ICalParseErrorKind::UnexpectedEof, last_line)
        .with_context(format!("{} component(s) left open", stack.len())))
}

fn finish(root: Component, next: Option<(usize, String)>) -> ICalParseResult<Component> {
    match next {
        None => Ok(root),
        Some((line_num, _)) => Err(ICalParseError::new(
            ICalParseErrorKind::TrailingContent,
            line_num,
        )),
    }
}
