//! Property catalog.
//!
//! Every property the server knows how to answer has a [`PropertyName`] with
//! a fixed namespace, and a matching [`PropertyValue`] variant that renders
//! itself into a namespaced element. Anything requested outside the catalog is
//! answered as not found.

mod outcome;
mod value;

use std::collections::HashMap;
use std::sync::LazyLock;

pub use outcome::{PropertyError, PropertyMap, PropertyResult, ResolvedProperty};
pub use value::{Ace, CalendarTransparency, Privilege, PropertyValue, ReportKind, ResourceTag};

use super::namespace::{Namespace, QName};

/// A cataloged property name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyName {
    // DAV:
    DisplayName,
    ResourceType,
    GetEtag,
    GetContentType,
    GetContentLength,
    GetLastModified,
    CreationDate,
    Owner,
    CurrentUserPrincipal,
    PrincipalUrl,
    PrincipalCollectionSet,
    CurrentUserPrivilegeSet,
    SupportedPrivilegeSet,
    Acl,
    SupportedReportSet,
    SyncToken,
    QuotaAvailableBytes,
    QuotaUsedBytes,
    GroupMembership,
    AlternateUriSet,
    SupportedLock,
    LockDiscovery,
    // CalDAV
    CalendarHomeSet,
    CalendarUserAddressSet,
    CalendarUserType,
    CalendarDescription,
    CalendarTimezone,
    SupportedCalendarComponentSet,
    SupportedCalendarData,
    MaxResourceSize,
    MinDateTime,
    MaxDateTime,
    MaxInstances,
    MaxAttendeesPerInstance,
    CalendarData,
    ScheduleCalendarTransp,
    // CalendarServer
    GetCtag,
    EmailAddressSet,
    // Google
    Hidden,
    Selected,
    Color,
    Timezone,
}

impl PropertyName {
    /// Every cataloged property.
    pub const ALL: [Self; 42] = [
        Self::DisplayName,
        Self::ResourceType,
        Self::GetEtag,
        Self::GetContentType,
        Self::GetContentLength,
        Self::GetLastModified,
        Self::CreationDate,
        Self::Owner,
        Self::CurrentUserPrincipal,
        Self::PrincipalUrl,
        Self::PrincipalCollectionSet,
        Self::CurrentUserPrivilegeSet,
        Self::SupportedPrivilegeSet,
        Self::Acl,
        Self::SupportedReportSet,
        Self::SyncToken,
        Self::QuotaAvailableBytes,
        Self::QuotaUsedBytes,
        Self::GroupMembership,
        Self::AlternateUriSet,
        Self::SupportedLock,
        Self::LockDiscovery,
        Self::CalendarHomeSet,
        Self::CalendarUserAddressSet,
        Self::CalendarUserType,
        Self::CalendarDescription,
        Self::CalendarTimezone,
        Self::SupportedCalendarComponentSet,
        Self::SupportedCalendarData,
        Self::MaxResourceSize,
        Self::MinDateTime,
        Self::MaxDateTime,
        Self::MaxInstances,
        Self::MaxAttendeesPerInstance,
        Self::CalendarData,
        Self::ScheduleCalendarTransp,
        Self::GetCtag,
        Self::EmailAddressSet,
        Self::Hidden,
        Self::Selected,
        Self::Color,
        Self::Timezone,
    ];

    /// Returns the element local name as it appears on the wire.
    #[must_use]
    pub const fn local_name(self) -> &'static str {
        match self {
            Self::DisplayName => "displayname",
            Self::ResourceType => "resourcetype",
            Self::GetEtag => "getetag",
            Self::GetContentType => "getcontenttype",
            Self::GetContentLength => "getcontentlength",
            Self::GetLastModified => "getlastmodified",
            Self::CreationDate => "creationdate",
            Self::Owner => "owner",
            Self::CurrentUserPrincipal => "current-user-principal",
            Self::PrincipalUrl => "principal-URL",
            Self::PrincipalCollectionSet => "principal-collection-set",
            Self::CurrentUserPrivilegeSet => "current-user-privilege-set",
            Self::SupportedPrivilegeSet => "supported-privilege-set",
            Self::Acl => "acl",
            Self::SupportedReportSet => "supported-report-set",
            Self::SyncToken => "sync-token",
            Self::QuotaAvailableBytes => "quota-available-bytes",
            Self::QuotaUsedBytes => "quota-used-bytes",
            Self::GroupMembership => "group-membership",
            Self::AlternateUriSet => "alternate-URI-set",
            Self::SupportedLock => "supportedlock",
            Self::LockDiscovery => "lockdiscovery",
            Self::CalendarHomeSet => "calendar-home-set",
            Self::CalendarUserAddressSet => "calendar-user-address-set",
            Self::CalendarUserType => "calendar-user-type",
            Self::CalendarDescription => "calendar-description",
            Self::CalendarTimezone => "calendar-timezone",
            Self::SupportedCalendarComponentSet => "supported-calendar-component-set",
            Self::SupportedCalendarData => "supported-calendar-data",
            Self::MaxResourceSize => "max-resource-size",
            Self::MinDateTime => "min-date-time",
            Self::MaxDateTime => "max-date-time",
            Self::MaxInstances => "max-instances",
            Self::MaxAttendeesPerInstance => "max-attendees-per-instance",
            Self::CalendarData => "calendar-data",
            Self::ScheduleCalendarTransp => "schedule-calendar-transp",
            Self::GetCtag => "getctag",
            Self::EmailAddressSet => "email-address-set",
            Self::Hidden => "hidden",
            Self::Selected => "selected",
            Self::Color => "color",
            Self::Timezone => "timezone",
        }
    }

    /// Returns the namespace the property lives in.
    #[must_use]
    pub const fn namespace(self) -> Namespace {
        match self {
            Self::CalendarHomeSet
            | Self::CalendarUserAddressSet
            | Self::CalendarUserType
            | Self::CalendarDescription
            | Self::CalendarTimezone
            | Self::SupportedCalendarComponentSet
            | Self::SupportedCalendarData
            | Self::MaxResourceSize
            | Self::MinDateTime
            | Self::MaxDateTime
            | Self::MaxInstances
            | Self::MaxAttendeesPerInstance
            | Self::CalendarData
            | Self::ScheduleCalendarTransp => Namespace::CALDAV,
            Self::GetCtag | Self::EmailAddressSet => Namespace::CS,
            Self::Hidden | Self::Selected | Self::Color | Self::Timezone => Namespace::GCAL,
            _ => Namespace::DAV,
        }
    }

    #[must_use]
    pub fn qname(self) -> QName {
        QName::new(self.namespace(), self.local_name())
    }

    /// Lower-cased lookup key.
    #[must_use]
    pub fn key(self) -> String {
        self.local_name().to_ascii_lowercase()
    }

    /// ## Summary
    /// Looks up a cataloged property by local name, case-insensitively.
    ///
    /// The namespace of the request element is not consulted.
    #[must_use]
    pub fn from_local_name(name: &str) -> Option<Self> {
        static BY_KEY: LazyLock<HashMap<String, PropertyName>> = LazyLock::new(|| {
            PropertyName::ALL
                .into_iter()
                .map(|name| (name.key(), name))
                .collect()
        });

        BY_KEY.get(&name.to_ascii_lowercase()).copied()
    }
}

impl std::fmt::Display for PropertyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.qname())
    }
}
