//! DAV request body parsing.

mod error;
mod filter;
mod mkcalendar;
mod propfind;
mod report;

pub use error::{FilterParseError, ParseError, ParseErrorKind, ParseResult};
pub use filter::parse_filter;
pub use mkcalendar::parse_mkcalendar;
pub use propfind::parse_propfind;
pub use report::parse_report;
