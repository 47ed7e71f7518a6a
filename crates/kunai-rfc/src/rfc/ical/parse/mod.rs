//! iCalendar text parsing (RFC 5545 §3.1, §3.4).

mod error;
mod lexer;
mod parser;

pub use error::{ICalParseError, ICalParseErrorKind, ICalParseResult};
pub use parser::parse_icalendar;
