use tokio::sync::OnceCell;

use kunai_rfc::rfc::dav::core::PropertyError;

use crate::dav::context::DavContext;
use crate::resource::Resource;
use crate::storage::{CalendarRecord, ObjectRecord, StorageError, StorageResult, UserRecord};

/// ## Summary
/// Per-resource resolution environment.
///
/// Backing records are fetched on first use and kept for the rest of this
/// resource's resolution, failures included, so each record costs at most
/// one storage call.
pub struct ResolveEnv<'a> {
    pub ctx: &'a DavContext,
    pub resource: &'a Resource,
    pub href: String,
    user: OnceCell<StorageResult<UserRecord>>,
    calendar: OnceCell<StorageResult<CalendarRecord>>,
    calendars: OnceCell<StorageResult<Vec<CalendarRecord>>>,
    object: OnceCell<StorageResult<ObjectRecord>>,
}

impl<'a> ResolveEnv<'a> {
    #[must_use]
    pub fn new(ctx: &'a DavContext, resource: &'a Resource, href: String) -> Self {
        Self {
            ctx,
            resource,
            href,
            user: OnceCell::new(),
            calendar: OnceCell::new(),
            calendars: OnceCell::new(),
            object: OnceCell::new(),
        }
    }

    /// Seeds the object record, e.g. with a calendar-query survivor.
    #[must_use]
    pub fn with_object(mut self, object: ObjectRecord) -> Self {
        self.object = OnceCell::from(Ok(object));
        self
    }

    /// ## Summary
    /// The resource's user, falling back to the authenticated principal.
    ///
    /// ## Errors
    /// `NotFound` when neither is known.
    pub fn user_id(&self) -> Result<&str, PropertyError> {
        self.resource
            .user_id()
            .or(self.ctx.principal.as_deref())
            .ok_or(PropertyError::NotFound)
    }

    /// ## Summary
    /// Returns the user record.
    ///
    /// ## Errors
    /// `NotFound` when the user is missing, `Internal` on storage failure.
    pub async fn user(&self) -> Result<&UserRecord, PropertyError> {
        let user_id = self.user_id()?;
        let result = self
            .user
            .get_or_init(|| async { self.ctx.storage.get_user(user_id).await })
            .await;
        to_property(result.as_ref())
    }

    /// ## Summary
    /// Returns the calendar the resource is, or lives in.
    ///
    /// ## Errors
    /// `NotFound` when there is no such calendar, `Internal` on storage failure.
    pub async fn calendar(&self) -> Result<&CalendarRecord, PropertyError> {
        let user_id = self.user_id()?;
        let calendar_id = self.resource.calendar_id().ok_or(PropertyError::NotFound)?;
        let result = self
            .calendar
            .get_or_init(|| async { self.ctx.storage.get_calendar(user_id, calendar_id).await })
            .await;
        to_property(result.as_ref())
    }

    /// ## Summary
    /// Returns every calendar of the resource's user.
    ///
    /// ## Errors
    /// `Internal` on storage failure.
    pub async fn calendars(&self) -> Result<&[CalendarRecord], PropertyError> {
        let user_id = self.user_id()?;
        let result = self
            .calendars
            .get_or_init(|| async { self.ctx.storage.get_user_calendars(user_id).await })
            .await;
        to_property(result.as_ref()).map(Vec::as_slice)
    }

    /// ## Summary
    /// Returns the object record.
    ///
    /// ## Errors
    /// `NotFound` when the object is missing, `Internal` on storage failure.
    pub async fn object(&self) -> Result<&ObjectRecord, PropertyError> {
        let user_id = self.user_id()?;
        let calendar_id = self.resource.calendar_id().ok_or(PropertyError::NotFound)?;
        let object_id = self.resource.object_id().ok_or(PropertyError::NotFound)?;
        let result = self
            .object
            .get_or_init(|| async {
                self.ctx
                    .storage
                    .get_object(user_id, calendar_id, object_id)
                    .await
            })
            .await;
        to_property(result.as_ref())
    }

    /// ## Summary
    /// Encodes another resource's href with the request's codec.
    ///
    /// ## Errors
    /// `Internal` if the resource cannot be encoded.
    pub fn href_of(&self, resource: &Resource) -> Result<String, PropertyError> {
        self.ctx.codec.encode_path(resource).map_err(|e| {
            tracing::warn!(error = %e, "Could not encode href during property resolution");
            PropertyError::Internal
        })
    }

    /// Href of the user's principal.
    ///
    /// ## Errors
    /// `NotFound` without a user, `Internal` if encoding fails.
    pub fn principal_href(&self) -> Result<String, PropertyError> {
        self.href_of(&Resource::principal(self.user_id()?))
    }
}

fn to_property<'r, T>(
    result: Result<&'r T, &'r StorageError>,
) -> Result<&'r T, PropertyError> {
    result.map_err(|e| match e {
        StorageError::NotFound(_) => PropertyError::NotFound,
        other => {
            tracing::warn!(error = %other, "Storage failure while resolving property");
            PropertyError::Internal
        }
    })
}
