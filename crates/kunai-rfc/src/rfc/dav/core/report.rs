//! `CalDAV` REPORT request bodies.

use super::filter::CompFilter;
use super::propfind::PropfindRequest;

/// `<calendar-query>` (RFC 4791 §7.8).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarQuery {
    pub props: PropfindRequest,
    /// `None` matches every object.
    pub filter: Option<CompFilter>,
}

/// `<calendar-multiget>` (RFC 4791 §7.9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMultiget {
    pub props: PropfindRequest,
    pub hrefs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportRequest {
    CalendarQuery(CalendarQuery),
    CalendarMultiget(CalendarMultiget),
}

impl ReportRequest {
    #[must_use]
    pub fn props(&self) -> &PropfindRequest {
        match self {
            Self::CalendarQuery(q) => &q.props,
            Self::CalendarMultiget(m) => &m.props,
        }
    }
}
