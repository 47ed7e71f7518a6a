//! The kunai protocol engine.
//!
//! Path addressing, storage, the calendar-query matcher, property resolution
//! and the PROPFIND/REPORT pipelines. Nothing here knows about HTTP.

pub mod auth;
pub mod caldav;
pub mod dav;
pub mod error;
pub mod resource;
pub mod storage;
