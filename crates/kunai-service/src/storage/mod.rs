//! The storage capability the protocol engine calls into.

mod etag;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use kunai_rfc::rfc::dav::core::{CompFilter, MkcalendarRequest};
use kunai_rfc::rfc::ical::core::{Component, ComponentKind};

pub use etag::generate_etag;
pub use memory::MemoryStorage;

/// A storage failure. `NotFound` is the only outcome callers branch on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub password_hash: String,
}

/// A calendar collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarRecord {
    pub user_id: String,
    pub id: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    /// VTIMEZONE text, or a bare TZID when created from a client's color/zone hint.
    pub timezone: Option<String>,
    pub color: Option<String>,
    pub components: Vec<ComponentKind>,
    pub read_only: bool,
    pub hidden: bool,
    pub selected: bool,
    /// Bumped on every change to the calendar or its objects.
    pub ctag: u64,
    /// Sum of the stored object sizes, in bytes.
    pub size: u64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl CalendarRecord {
    /// Returns the `getctag` value.
    #[must_use]
    pub fn ctag(&self) -> String {
        self.ctag.to_string()
    }

    /// Returns the `sync-token` URI.
    #[must_use]
    pub fn sync_token(&self) -> String {
        format!("urn:kunai:sync:{}:{}", self.id, self.ctag)
    }

    /// Returns the collection `ETag`.
    #[must_use]
    pub fn etag(&self) -> String {
        format!("\"{}-{}\"", self.id, self.ctag)
    }
}

/// A stored calendar object resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub user_id: String,
    pub calendar_id: String,
    pub id: String,
    /// The parsed `VCALENDAR`.
    pub component: Component,
    /// Serialized form of `component`; `etag` is computed over it.
    pub data: String,
    pub etag: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl ObjectRecord {
    /// Returns the kind of calendar data the object carries.
    #[must_use]
    pub fn kind(&self) -> Option<ComponentKind> {
        self.component.primary_kind()
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        u64::try_from(self.data.len()).unwrap_or(u64::MAX)
    }
}

/// ## Summary
/// Backend for users, calendars and calendar objects.
///
/// Implementations must be safe to share across request tasks.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_user(&self, user_id: &str) -> StorageResult<UserRecord>;

    async fn get_calendar(&self, user_id: &str, calendar_id: &str) -> StorageResult<CalendarRecord>;

    async fn get_object(
        &self,
        user_id: &str,
        calendar_id: &str,
        object_id: &str,
    ) -> StorageResult<ObjectRecord>;

    /// Returns the user's calendars ordered by id.
    async fn get_user_calendars(&self, user_id: &str) -> StorageResult<Vec<CalendarRecord>>;

    /// Returns the object path segments in a collection, ordered.
    async fn get_object_paths_in_collection(
        &self,
        user_id: &str,
        calendar_id: &str,
    ) -> StorageResult<Vec<String>>;

    /// ## Summary
    /// Returns candidate objects for a calendar-query.
    ///
    /// Implementations may drop objects that cannot match; the caller still
    /// evaluates `filter` on every returned object.
    async fn get_objects_by_filter(
        &self,
        user_id: &str,
        calendar_id: &str,
        filter: Option<&CompFilter>,
    ) -> StorageResult<Vec<ObjectRecord>>;

    /// ## Errors
    /// Returns [`StorageError::AlreadyExists`] if the calendar exists.
    async fn create_calendar(
        &self,
        user_id: &str,
        calendar_id: &str,
        request: &MkcalendarRequest,
    ) -> StorageResult<CalendarRecord>;

    /// Creates or replaces an object.
    async fn update_object(
        &self,
        user_id: &str,
        calendar_id: &str,
        object_id: &str,
        component: Component,
    ) -> StorageResult<ObjectRecord>;

    async fn delete_object(
        &self,
        user_id: &str,
        calendar_id: &str,
        object_id: &str,
    ) -> StorageResult<()>;

    /// ## Summary
    /// Checks credentials and returns the user id.
    ///
    /// ## Errors
    /// Returns [`StorageError::InvalidCredentials`] for an unknown user or a
    /// wrong password.
    async fn auth_user(&self, username: &str, password: &str) -> StorageResult<String>;
}
