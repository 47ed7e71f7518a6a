// Per-method handlers below the DAV prefix.

pub mod delete;
pub mod get_head;
pub mod mkcalendar;
pub mod options;
pub mod propfind;
pub mod put;
pub mod report;
