//! MKCALENDAR request body.

use crate::rfc::ical::core::ComponentKind;

/// Initial properties for a calendar collection (RFC 4791 §5.3.1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MkcalendarRequest {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub timezone: Option<String>,
    pub color: Option<String>,
    /// Empty means the server default.
    pub components: Vec<ComponentKind>,
}
