//! Protocol types and wire codecs for the kunai `CalDAV` server.
//!
//! - [`rfc::xml`]: an owned, namespace-aware XML tree.
//! - [`rfc::dav`]: `WebDAV`/`CalDAV` request types, parsers and multistatus building.
//! - [`rfc::ical`]: the iCalendar component model and text codec.

pub mod error;
pub mod rfc;
