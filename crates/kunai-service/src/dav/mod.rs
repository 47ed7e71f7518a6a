//! `WebDAV` pipelines: PROPFIND and REPORT over the resource tree, plus the
//! object and collection operations behind the plain HTTP methods.

pub mod collection;
pub mod context;
pub mod object;
pub mod propfind;
pub mod report;
pub mod resolve;
pub mod walker;

pub use collection::make_calendar;
pub use context::DavContext;
pub use object::{Preconditions, PutObjectResult, delete_object, get_object, put_object};
pub use propfind::{propfind, propfind_resource};
pub use report::{calendar_multiget, calendar_query, report};
