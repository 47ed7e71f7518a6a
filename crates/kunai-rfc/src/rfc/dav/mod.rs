//! `WebDAV` and `CalDAV` protocol vocabulary.
//!
//! - `core`: request, filter and property types
//! - `parse`: request body parsing from the XML tree
//! - `build`: multistatus construction and merging

pub mod build;
pub mod core;
pub mod parse;
