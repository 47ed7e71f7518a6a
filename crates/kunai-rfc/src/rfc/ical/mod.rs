//! iCalendar (RFC 5545) component model and text codec.

pub mod build;
pub mod core;
pub mod parse;
