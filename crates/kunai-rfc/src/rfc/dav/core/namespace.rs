//! XML namespace and qualified name types.

use std::borrow::Cow;

/// `DAV:` namespace URI.
pub const DAV_NS: &str = "DAV:";

/// `CalDAV` namespace URI.
pub const CALDAV_NS: &str = "urn:ietf:params:xml:ns:caldav";

/// `CalendarServer` (Apple) namespace URI.
pub const CS_NS: &str = "http://calendarserver.org/ns/";

/// Google Calendar extension namespace URI.
pub const GCAL_NS: &str = "http://schemas.google.com/gCal/2005";

/// An XML namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(pub Cow<'static, str>);

impl Namespace {
    /// `DAV:` namespace.
    pub const DAV: Self = Self(Cow::Borrowed(DAV_NS));

    /// `CalDAV` namespace.
    pub const CALDAV: Self = Self(Cow::Borrowed(CALDAV_NS));

    /// `CalendarServer` namespace.
    pub const CS: Self = Self(Cow::Borrowed(CS_NS));

    /// Google Calendar namespace.
    pub const GCAL: Self = Self(Cow::Borrowed(GCAL_NS));

    /// Namespaces declared on every multistatus root, in declaration order.
    pub const KNOWN: [Self; 4] = [Self::DAV, Self::CALDAV, Self::CS, Self::GCAL];

    /// Creates a new namespace from a string.
    #[must_use]
    pub fn new(uri: impl Into<Cow<'static, str>>) -> Self {
        Self(uri.into())
    }

    /// Returns the namespace URI.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the fixed response prefix for this namespace.
    #[must_use]
    pub fn prefix(&self) -> Option<&'static str> {
        match self.0.as_ref() {
            DAV_NS => Some("d"),
            CALDAV_NS => Some("cal"),
            CS_NS => Some("cs"),
            GCAL_NS => Some("g"),
            _ => None,
        }
    }
}

impl From<&'static str> for Namespace {
    fn from(s: &'static str) -> Self {
        Self(Cow::Borrowed(s))
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

/// A qualified XML name (namespace + local name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// The namespace URI.
    pub namespace: Namespace,
    /// The local name.
    pub local_name: Cow<'static, str>,
}

impl QName {
    /// Creates a new qualified name.
    #[must_use]
    pub fn new(namespace: impl Into<Namespace>, local_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    /// Creates a `DAV:` qualified name.
    #[must_use]
    pub fn dav(local_name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Namespace::DAV, local_name)
    }

    /// Creates a `CalDAV` qualified name.
    #[must_use]
    pub fn caldav(local_name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Namespace::CALDAV, local_name)
    }

    /// Returns the local name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Returns the namespace URI.
    #[must_use]
    pub fn namespace_uri(&self) -> &str {
        self.namespace.as_str()
    }

    /// ## Summary
    /// Returns the tag to write for this name.
    ///
    /// Names in a known namespace use its fixed prefix and rely on the root
    /// declarations; anything else is written unprefixed and must carry its
    /// own default namespace declaration (see [`QName::needs_local_declaration`]).
    #[must_use]
    pub fn tag(&self) -> String {
        match self.namespace.prefix() {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.to_string(),
        }
    }

    /// Returns whether the element must declare its own namespace.
    #[must_use]
    pub fn needs_local_declaration(&self) -> bool {
        self.namespace.prefix().is_none()
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}{}", self.namespace.as_str(), self.local_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_namespaces_have_fixed_prefixes() {
        assert_eq!(Namespace::DAV.prefix(), Some("d"));
        assert_eq!(Namespace::CALDAV.prefix(), Some("cal"));
        assert_eq!(Namespace::CS.prefix(), Some("cs"));
        assert_eq!(Namespace::GCAL.prefix(), Some("g"));
        assert_eq!(Namespace::new("urn:x").prefix(), None);
    }

    #[test]
    fn tag_uses_prefix_when_known() {
        assert_eq!(QName::caldav("calendar-data").tag(), "cal:calendar-data");
        let foreign = QName::new(Namespace::new("urn:x"), "foo");
        assert_eq!(foreign.tag(), "foo");
        assert!(foreign.needs_local_declaration());
        assert_eq!(foreign.to_string(), "{urn:x}foo");
    }
}
