//! `WebDAV` and `CalDAV` request, filter and property types.

mod depth;
pub mod filter;
mod mkcalendar;
mod namespace;
pub mod property;
mod propfind;
mod report;
mod status;

pub use depth::Depth;
pub use mkcalendar::MkcalendarRequest;
pub use filter::{
    Collation, CompFilter, FilterTest, MatchType, ParamFilter, PropFilter, TextMatch, TimeRange,
};
pub use namespace::{CALDAV_NS, CS_NS, DAV_NS, GCAL_NS, Namespace, QName};
pub use property::{
    Ace, CalendarTransparency, Privilege, PropertyError, PropertyMap, PropertyName,
    PropertyResult, PropertyValue, ReportKind, ResolvedProperty, ResourceTag,
};
pub use propfind::PropfindRequest;
pub use report::{CalendarMultiget, CalendarQuery, ReportRequest};
pub use status::Status;
