/// Route component constants shared across crates
pub const DAV_ROUTE_COMPONENT: &str = "dav";
pub const DAV_ROUTE_PREFIX: &str = const_str::concat!("/", DAV_ROUTE_COMPONENT);

/// Second path segment that separates a principal from its calendar home.
pub const CALDAV_ROUTE_COMPONENT: &str = "cal";

pub const SERVER_NAME: &str = "kunai";
pub const BASIC_AUTH_REALM: &str = "kunai";
pub const BASIC_AUTH_CHALLENGE: &str =
    const_str::concat!("Basic realm=\"", BASIC_AUTH_REALM, "\"");

/// DAV compliance classes advertised by OPTIONS.
pub const DAV_COMPLIANCE: &str = "1, 3, calendar-access";

pub const ICALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
