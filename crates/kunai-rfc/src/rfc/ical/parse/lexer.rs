//! Content line lexer.

use super::error::{ICalParseError, ICalParseErrorKind, ICalParseResult};
use crate::rfc::ical::core::{Parameter, Property};

/// ## Summary
/// Splits input into unfolded content lines with their starting line numbers.
///
/// Accepts CRLF or bare LF. A line beginning with a space or tab continues
/// the previous one; the CRLF and that single whitespace character are
/// removed. Blank lines are skipped.
#[must_use]
pub fn split_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (i, raw) in input.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.is_empty() {
            continue;
        }

        if let Some(continuation) = line.strip_prefix([' ', '\t']) {
            if let Some((_, prev)) = lines.last_mut() {
                prev.push_str(continuation);
                continue;
            }
        }

        lines.push((i + 1, line.to_string()));
    }

    lines
}

/// ## Summary
/// Parses one unfolded content line: `name *(";" param) ":" value`.
///
/// ## Errors
/// Returns an error if the name or a parameter is malformed, or no `:`
/// separates the value.
pub fn parse_content_line(line: &str, line_num: usize) -> ICalParseResult<Property> {
    let name_end = line
        .find([';', ':'])
        .ok_or_else(|| ICalParseError::new(ICalParseErrorKind::MissingColon, line_num))?;

    let name = &line[..name_end];
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        return Err(ICalParseError::new(ICalParseErrorKind::InvalidPropertyName, line_num)
            .with_context(name.to_string()));
    }

    let mut prop = Property::new(name, "");
    let mut rest = &line[name_end..];

    while let Some(after_semi) = rest.strip_prefix(';') {
        let (param, remaining) = parse_parameter(after_semi, line_num)?;
        prop.params.push(param);
        rest = remaining;
    }

    let value = rest
        .strip_prefix(':')
        .ok_or_else(|| ICalParseError::new(ICalParseErrorKind::MissingColon, line_num))?;
    prop.value = value.to_string();

    Ok(prop)
}

/// Parses `name=value *("," value)` and returns the unparsed remainder,
/// which starts at the next `;` or `:`.
fn parse_parameter(input: &str, line_num: usize) -> ICalParseResult<(Parameter, &str)> {
    let eq = input
        .find('=')
        .ok_or_else(|| ICalParseError::new(ICalParseErrorKind::InvalidParameter, line_num))?;
    let name = &input[..eq];
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        return Err(ICalParseError::new(ICalParseErrorKind::InvalidParameter, line_num)
            .with_context(name.to_string()));
    }

    let mut values = Vec::new();
    let mut rest = &input[eq + 1..];
    loop {
        let (value, remaining) = if let Some(quoted) = rest.strip_prefix('"') {
            let close = quoted.find('"').ok_or_else(|| {
                ICalParseError::new(ICalParseErrorKind::UnterminatedQuote, line_num)
            })?;
            (&quoted[..close], &quoted[close + 1..])
        } else {
            let end = rest.find([',', ';', ':']).unwrap_or(rest.len());
            (&rest[..end], &rest[end..])
        };
        values.push(decode_caret(value));

        match remaining.strip_prefix(',') {
            Some(next) => rest = next,
            None => return Ok((Parameter::with_values(name, values), remaining)),
        }
    }
}

/// Resolves RFC 6868 caret escapes. Unknown sequences are kept as written.
fn decode_caret(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '^' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('^') => out.push('^'),
            Some('n') => out.push('\n'),
            Some('\'') => out.push('"'),
            _ => {
                out.push('^');
                continue;
            }
        }
        chars.next();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfolds_crlf_and_lf_continuations() {
        let lines = split_lines("SUMMARY:Long\r\n  meeting\r\nDESCRIPTION:a\n\tb\n\nUID:1\r\n");
        assert_eq!(
            lines,
            vec![
                (1, "SUMMARY:Long meeting".to_string()),
                (3, "DESCRIPTION:ab".to_string()),
                (6, "UID:1".to_string()),
            ]
        );
    }

    #[test]
    fn parses_params_with_quotes_and_lists() {
        let prop = parse_content_line(
            r#"ATTENDEE;ROLE=REQ-PARTICIPANT;DELEGATED-FROM="mailto:a@x.org","mailto:b@x.org";CN=Jane ^'JD^' Doe:mailto:jane@x.org"#,
            1,
        )
        .expect("parse");

        assert_eq!(prop.name, "ATTENDEE");
        assert_eq!(prop.param_value("ROLE"), Some("REQ-PARTICIPANT"));
        assert_eq!(
            prop.get_param("DELEGATED-FROM").map(|p| p.values.clone()),
            Some(vec!["mailto:a@x.org".to_string(), "mailto:b@x.org".to_string()])
        );
        assert_eq!(prop.param_value("CN"), Some("Jane \"JD\" Doe"));
        assert_eq!(prop.value, "mailto:jane@x.org");
    }

    #[test]
    fn value_may_contain_colons() {
        let prop = parse_content_line("URL:https://example.com:8443/a", 4).expect("parse");
        assert_eq!(prop.value, "https://example.com:8443/a");
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(
            parse_content_line("NOCOLON", 2).map_err(|e| e.kind),
            Err(ICalParseErrorKind::MissingColon)
        );
        assert_eq!(
            parse_content_line("BAD NAME:x", 2).map_err(|e| e.kind),
            Err(ICalParseErrorKind::InvalidPropertyName)
        );
        assert_eq!(
            parse_content_line("X;CN=\"open:x", 2).map_err(|e| e.kind),
            Err(ICalParseErrorKind::UnterminatedQuote)
        );
        assert_eq!(
            parse_content_line("X;=1:x", 2).map_err(|e| e.kind),
            Err(ICalParseErrorKind::InvalidParameter)
        );
    }
}
