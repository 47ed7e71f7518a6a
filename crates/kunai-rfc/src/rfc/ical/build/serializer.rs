use super::fold::fold_line;
use crate::rfc::ical::core::{Component, Parameter, Property};

/// ## Summary
/// Serializes a component tree as iCalendar text.
///
/// Properties keep their order and raw values. Lines end in CRLF and are
/// folded at 75 octets.
#[must_use]
pub fn serialize_icalendar(component: &Component) -> String {
    let mut out = String::new();
    write_component(&mut out, component);
    out
}

fn write_component(out: &mut String, component: &Component) {
    out.push_str(&fold_line(&format!("BEGIN:{}", component.name)));
    for prop in &component.properties {
        out.push_str(&fold_line(&property_line(prop)));
    }
    for child in &component.children {
        write_component(out, child);
    }
    out.push_str(&fold_line(&format!("END:{}", component.name)));
}

fn property_line(prop: &Property) -> String {
    let mut line = prop.name.clone();
    for param in &prop.params {
        line.push(';');
        line.push_str(&param_text(param));
    }
    line.push(':');
    line.push_str(&prop.value);
    line
}

fn param_text(param: &Parameter) -> String {
    let values: Vec<String> = param.values.iter().map(|v| param_value(v)).collect();
    format!("{}={}", param.name, values.join(","))
}

/// Caret-encodes a parameter value (RFC 6868) and quotes it when needed.
fn param_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '^' => encoded.push_str("^^"),
            '\n' => encoded.push_str("^n"),
            '"' => encoded.push_str("^'"),
            _ => encoded.push(c),
        }
    }

    if encoded.contains([':', ';', ',']) {
        format!("\"{encoded}\"")
    } else {
        encoded
    }
}
