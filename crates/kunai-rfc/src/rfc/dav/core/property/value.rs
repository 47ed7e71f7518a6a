use chrono::{DateTime, Utc};

use super::PropertyName;
use crate::rfc::dav::core::namespace::QName;
use crate::rfc::ical::core::ComponentKind;
use crate::rfc::xml::Element;

/// A child of `DAV:resourcetype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceTag {
    Collection,
    Principal,
    Calendar,
    /// Concrete component kind of a calendar object.
    Component(ComponentKind),
}

impl ResourceTag {
    fn qname(self) -> QName {
        match self {
            Self::Collection => QName::dav("collection"),
            Self::Principal => QName::dav("principal"),
            Self::Calendar => QName::caldav("calendar"),
            Self::Component(kind) => QName::caldav(kind.as_str().to_ascii_lowercase()),
        }
    }
}

/// A `DAV:` privilege (RFC 3744 §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    All,
    Read,
    Write,
    WriteProperties,
    WriteContent,
    Bind,
    Unbind,
    ReadAcl,
    ReadCurrentUserPrivilegeSet,
}

impl Privilege {
    /// Privileges held on a writable resource.
    pub const READ_WRITE: [Self; 8] = [
        Self::Read,
        Self::Write,
        Self::WriteProperties,
        Self::WriteContent,
        Self::Bind,
        Self::Unbind,
        Self::ReadAcl,
        Self::ReadCurrentUserPrivilegeSet,
    ];

    /// Privileges held on a read-only resource.
    pub const READ_ONLY: [Self; 3] = [
        Self::Read,
        Self::ReadAcl,
        Self::ReadCurrentUserPrivilegeSet,
    ];

    #[must_use]
    pub const fn local_name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Read => "read",
            Self::Write => "write",
            Self::WriteProperties => "write-properties",
            Self::WriteContent => "write-content",
            Self::Bind => "bind",
            Self::Unbind => "unbind",
            Self::ReadAcl => "read-acl",
            Self::ReadCurrentUserPrivilegeSet => "read-current-user-privilege-set",
        }
    }

    /// Returns the privilege set for a resource given its read-only flag.
    #[must_use]
    pub fn for_access(read_only: bool) -> Vec<Self> {
        if read_only {
            Self::READ_ONLY.to_vec()
        } else {
            Self::READ_WRITE.to_vec()
        }
    }

    fn to_element(self) -> Element {
        dav("privilege").with_child(dav(self.local_name()))
    }
}

/// A granting access control entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ace {
    pub principal_href: String,
    pub grant: Vec<Privilege>,
    pub protected: bool,
}

/// Reports advertised in `DAV:supported-report-set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    CalendarQuery,
    CalendarMultiget,
}

impl ReportKind {
    pub const ALL: [Self; 2] = [Self::CalendarQuery, Self::CalendarMultiget];

    #[must_use]
    pub const fn local_name(self) -> &'static str {
        match self {
            Self::CalendarQuery => "calendar-query",
            Self::CalendarMultiget => "calendar-multiget",
        }
    }
}

/// Value of `CALDAV:schedule-calendar-transp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarTransparency {
    #[default]
    Opaque,
    Transparent,
}

/// A resolved property value.
///
/// Each variant belongs to exactly one [`PropertyName`] and renders itself as
/// that property's element.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    DisplayName(String),
    ResourceType(Vec<ResourceTag>),
    GetEtag(String),
    GetContentType(String),
    GetContentLength(u64),
    GetLastModified(DateTime<Utc>),
    CreationDate(DateTime<Utc>),
    Owner(String),
    CurrentUserPrincipal(String),
    PrincipalUrl(String),
    PrincipalCollectionSet(Vec<String>),
    CurrentUserPrivilegeSet(Vec<Privilege>),
    SupportedPrivilegeSet(Vec<Privilege>),
    Acl(Vec<Ace>),
    SupportedReportSet(Vec<ReportKind>),
    SyncToken(String),
    QuotaAvailableBytes(u64),
    QuotaUsedBytes(u64),
    GroupMembership(Vec<String>),
    AlternateUriSet(Vec<String>),
    SupportedLock,
    LockDiscovery,
    CalendarHomeSet(String),
    CalendarUserAddressSet(Vec<String>),
    CalendarUserType(String),
    CalendarDescription(String),
    CalendarTimezone(String),
    SupportedCalendarComponentSet(Vec<ComponentKind>),
    SupportedCalendarData,
    MaxResourceSize(u64),
    MinDateTime(DateTime<Utc>),
    MaxDateTime(DateTime<Utc>),
    MaxInstances(u32),
    MaxAttendeesPerInstance(u32),
    CalendarData(String),
    ScheduleCalendarTransp(CalendarTransparency),
    GetCtag(String),
    EmailAddressSet(Vec<String>),
    Hidden(bool),
    Selected(bool),
    Color(String),
    Timezone(String),
}

impl PropertyValue {
    /// Returns the catalog entry this value answers.
    #[must_use]
    pub const fn name(&self) -> PropertyName {
        match self {
            Self::DisplayName(_) => PropertyName::DisplayName,
            Self::ResourceType(_) => PropertyName::ResourceType,
            Self::GetEtag(_) => PropertyName::GetEtag,
            Self::GetContentType(_) => PropertyName::GetContentType,
            Self::GetContentLength(_) => PropertyName::GetContentLength,
            Self::GetLastModified(_) => PropertyName::GetLastModified,
            Self::CreationDate(_) => PropertyName::CreationDate,
            Self::Owner(_) => PropertyName::Owner,
            Self::CurrentUserPrincipal(_) => PropertyName::CurrentUserPrincipal,
            Self::PrincipalUrl(_) => PropertyName::PrincipalUrl,
            Self::PrincipalCollectionSet(_) => PropertyName::PrincipalCollectionSet,
            Self::CurrentUserPrivilegeSet(_) => PropertyName::CurrentUserPrivilegeSet,
            Self::SupportedPrivilegeSet(_) => PropertyName::SupportedPrivilegeSet,
            Self::Acl(_) => PropertyName::Acl,
            Self::SupportedReportSet(_) => PropertyName::SupportedReportSet,
            Self::SyncToken(_) => PropertyName::SyncToken,
            Self::QuotaAvailableBytes(_) => PropertyName::QuotaAvailableBytes,
            Self::QuotaUsedBytes(_) => PropertyName::QuotaUsedBytes,
            Self::GroupMembership(_) => PropertyName::GroupMembership,
            Self::AlternateUriSet(_) => PropertyName::AlternateUriSet,
            Self::SupportedLock => PropertyName::SupportedLock,
            Self::LockDiscovery => PropertyName::LockDiscovery,
            Self::CalendarHomeSet(_) => PropertyName::CalendarHomeSet,
            Self::CalendarUserAddressSet(_) => PropertyName::CalendarUserAddressSet,
            Self::CalendarUserType(_) => PropertyName::CalendarUserType,
            Self::CalendarDescription(_) => PropertyName::CalendarDescription,
            Self::CalendarTimezone(_) => PropertyName::CalendarTimezone,
            Self::SupportedCalendarComponentSet(_) => PropertyName::SupportedCalendarComponentSet,
            Self::SupportedCalendarData => PropertyName::SupportedCalendarData,
            Self::MaxResourceSize(_) => PropertyName::MaxResourceSize,
            Self::MinDateTime(_) => PropertyName::MinDateTime,
            Self::MaxDateTime(_) => PropertyName::MaxDateTime,
            Self::MaxInstances(_) => PropertyName::MaxInstances,
            Self::MaxAttendeesPerInstance(_) => PropertyName::MaxAttendeesPerInstance,
            Self::CalendarData(_) => PropertyName::CalendarData,
            Self::ScheduleCalendarTransp(_) => PropertyName::ScheduleCalendarTransp,
            Self::GetCtag(_) => PropertyName::GetCtag,
            Self::EmailAddressSet(_) => PropertyName::EmailAddressSet,
            Self::Hidden(_) => PropertyName::Hidden,
            Self::Selected(_) => PropertyName::Selected,
            Self::Color(_) => PropertyName::Color,
            Self::Timezone(_) => PropertyName::Timezone,
        }
    }

    /// ## Summary
    /// Renders the value as its property element.
    ///
    /// The element uses the fixed namespace prefix of its property; the
    /// declarations themselves live on the multistatus root.
    #[must_use]
    pub fn to_element(&self) -> Element {
        let elem = Element::new(self.name().qname().tag());

        match self {
            Self::DisplayName(s)
            | Self::GetEtag(s)
            | Self::GetContentType(s)
            | Self::SyncToken(s)
            | Self::CalendarUserType(s)
            | Self::CalendarDescription(s)
            | Self::CalendarTimezone(s)
            | Self::CalendarData(s)
            | Self::GetCtag(s)
            | Self::Color(s)
            | Self::Timezone(s) => elem.with_text(s.as_str()),
            Self::GetContentLength(n)
            | Self::QuotaAvailableBytes(n)
            | Self::QuotaUsedBytes(n)
            | Self::MaxResourceSize(n) => elem.with_text(n.to_string()),
            Self::MaxInstances(n) | Self::MaxAttendeesPerInstance(n) => {
                elem.with_text(n.to_string())
            }
            Self::Hidden(b) | Self::Selected(b) => elem.with_text(b.to_string()),
            Self::GetLastModified(dt) => {
                elem.with_text(dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
            }
            Self::CreationDate(dt) => elem.with_text(dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            Self::MinDateTime(dt) | Self::MaxDateTime(dt) => {
                elem.with_text(dt.format("%Y%m%dT%H%M%SZ").to_string())
            }
            Self::Owner(href)
            | Self::CurrentUserPrincipal(href)
            | Self::PrincipalUrl(href)
            | Self::CalendarHomeSet(href) => elem.with_child(href_element(href)),
            Self::PrincipalCollectionSet(hrefs)
            | Self::GroupMembership(hrefs)
            | Self::AlternateUriSet(hrefs)
            | Self::CalendarUserAddressSet(hrefs) => hrefs
                .iter()
                .fold(elem, |e, href| e.with_child(href_element(href))),
            Self::ResourceType(tags) => tags
                .iter()
                .fold(elem, |e, tag| e.with_child(Element::new(tag.qname().tag()))),
            Self::CurrentUserPrivilegeSet(privileges) => privileges
                .iter()
                .fold(elem, |e, p| e.with_child(p.to_element())),
            Self::SupportedPrivilegeSet(privileges) => {
                let all = privileges.iter().fold(
                    dav("supported-privilege").with_child(Privilege::All.to_element()),
                    |e, p| {
                        e.with_child(dav("supported-privilege").with_child(p.to_element()))
                    },
                );
                elem.with_child(all)
            }
            Self::Acl(aces) => aces.iter().fold(elem, |e, ace| {
                let mut grant = dav("grant");
                for p in &ace.grant {
                    grant.push(p.to_element());
                }
                let mut ace_elem = dav("ace")
                    .with_child(dav("principal").with_child(href_element(&ace.principal_href)))
                    .with_child(grant);
                if ace.protected {
                    ace_elem.push(dav("protected"));
                }
                e.with_child(ace_elem)
            }),
            Self::SupportedReportSet(reports) => reports.iter().fold(elem, |e, r| {
                e.with_child(dav("supported-report").with_child(
                    dav("report").with_child(Element::new(QName::caldav(r.local_name()).tag())),
                ))
            }),
            Self::SupportedLock | Self::LockDiscovery => elem,
            Self::SupportedCalendarComponentSet(kinds) => kinds.iter().fold(elem, |e, kind| {
                e.with_child(Element::new("cal:comp").with_attr("name", kind.as_str()))
            }),
            Self::SupportedCalendarData => elem.with_child(
                Element::new("cal:calendar-data")
                    .with_attr("content-type", "text/calendar")
                    .with_attr("version", "2.0"),
            ),
            Self::ScheduleCalendarTransp(transp) => elem.with_child(Element::new(match transp {
                CalendarTransparency::Opaque => "cal:opaque",
                CalendarTransparency::Transparent => "cal:transparent",
            })),
            Self::EmailAddressSet(emails) => emails.iter().fold(elem, |e, email| {
                e.with_child(Element::new("cs:email-address").with_text(email.as_str()))
            }),
        }
    }
}

fn dav(local_name: &str) -> Element {
    Element::new(format!("d:{local_name}"))
}

fn href_element(href: &str) -> Element {
    dav("href").with_text(href)
}
