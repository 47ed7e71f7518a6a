//! Typed resource identities and the path codec that maps them to URLs.

mod path;

pub use path::{PathCodec, PathError};

/// Position of a resource in the DAV tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// The prefix itself.
    ServiceRoot,
    /// `/{user}/`
    Principal,
    /// `/{user}/cal/`
    HomeSet,
    /// `/{user}/cal/{calendar}/`
    Collection,
    /// `/{user}/cal/{calendar}/{object}`
    Object,
    Unknown,
}

impl ResourceType {
    /// Returns whether the walker never expands this type.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::HomeSet | Self::Collection)
    }
}

/// ## Summary
/// Identity of one addressable resource.
///
/// Which ids are set depends on `kind`: a `Principal` or `HomeSet` carries a
/// user, a `Collection` adds a calendar, an `Object` carries all three.
/// Equality ignores the cached URI.
#[derive(Debug, Clone, Eq)]
pub struct Resource {
    pub user_id: Option<String>,
    pub calendar_id: Option<String>,
    pub object_id: Option<String>,
    pub kind: ResourceType,
    uri: Option<String>,
}

impl Resource {
    #[must_use]
    pub fn new(
        kind: ResourceType,
        user_id: Option<String>,
        calendar_id: Option<String>,
        object_id: Option<String>,
    ) -> Self {
        Self {
            user_id,
            calendar_id,
            object_id,
            kind,
            uri: None,
        }
    }

    #[must_use]
    pub fn service_root() -> Self {
        Self::new(ResourceType::ServiceRoot, None, None, None)
    }

    #[must_use]
    pub fn principal(user_id: impl Into<String>) -> Self {
        Self::new(ResourceType::Principal, Some(user_id.into()), None, None)
    }

    #[must_use]
    pub fn home_set(user_id: impl Into<String>) -> Self {
        Self::new(ResourceType::HomeSet, Some(user_id.into()), None, None)
    }

    #[must_use]
    pub fn collection(user_id: impl Into<String>, calendar_id: impl Into<String>) -> Self {
        Self::new(
            ResourceType::Collection,
            Some(user_id.into()),
            Some(calendar_id.into()),
            None,
        )
    }

    #[must_use]
    pub fn object(
        user_id: impl Into<String>,
        calendar_id: impl Into<String>,
        object_id: impl Into<String>,
    ) -> Self {
        Self::new(
            ResourceType::Object,
            Some(user_id.into()),
            Some(calendar_id.into()),
            Some(object_id.into()),
        )
    }

    /// Attaches the encoded path.
    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Returns the cached encoded path, if one was attached.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    #[must_use]
    pub fn calendar_id(&self) -> Option<&str> {
        self.calendar_id.as_deref()
    }

    #[must_use]
    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.user_id == other.user_id
            && self.calendar_id == other.calendar_id
            && self.object_id == other.object_id
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.uri {
            Some(uri) => write!(f, "{:?}({uri})", self.kind),
            None => write!(f, "{:?}", self.kind),
        }
    }
}
