//! In-memory storage backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use kunai_core::config::{Settings, UserConfig};
use kunai_rfc::rfc::dav::core::{CompFilter, FilterTest, MkcalendarRequest};
use kunai_rfc::rfc::ical::build::serialize_icalendar;
use kunai_rfc::rfc::ical::core::{Component, ComponentKind};

use super::{
    CalendarRecord, ObjectRecord, Storage, StorageError, StorageResult, UserRecord, generate_etag,
};
use crate::auth::password::verify_password;

struct CalendarEntry {
    record: CalendarRecord,
    objects: BTreeMap<String, ObjectRecord>,
}

impl CalendarEntry {
    fn touch(&mut self) {
        self.record.ctag += 1;
        self.record.modified = Utc::now();
        self.record.size = self.objects.values().map(ObjectRecord::size).sum();
    }
}

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<String, UserRecord>,
    /// Keyed by `(user_id, calendar_id)`.
    calendars: BTreeMap<(String, String), CalendarEntry>,
}

impl MemoryState {
    fn calendar(&self, user_id: &str, calendar_id: &str) -> StorageResult<&CalendarEntry> {
        self.calendars
            .get(&(user_id.to_string(), calendar_id.to_string()))
            .ok_or_else(|| StorageError::NotFound(format!("calendar {user_id}/{calendar_id}")))
    }

    fn calendar_mut(
        &mut self,
        user_id: &str,
        calendar_id: &str,
    ) -> StorageResult<&mut CalendarEntry> {
        self.calendars
            .get_mut(&(user_id.to_string(), calendar_id.to_string()))
            .ok_or_else(|| StorageError::NotFound(format!("calendar {user_id}/{calendar_id}")))
    }

    fn insert_calendar(
        &mut self,
        user_id: &str,
        calendar_id: &str,
        request: &MkcalendarRequest,
    ) -> StorageResult<CalendarRecord> {
        if !self.users.contains_key(user_id) {
            return Err(StorageError::NotFound(format!("user {user_id}")));
        }
        let key = (user_id.to_string(), calendar_id.to_string());
        if self.calendars.contains_key(&key) {
            return Err(StorageError::AlreadyExists(format!(
                "calendar {user_id}/{calendar_id}"
            )));
        }

        let now = Utc::now();
        let record = CalendarRecord {
            user_id: user_id.to_string(),
            id: calendar_id.to_string(),
            display_name: request.display_name.clone(),
            description: request.description.clone(),
            timezone: request.timezone.clone(),
            color: request.color.clone(),
            components: if request.components.is_empty() {
                ComponentKind::STORABLE.to_vec()
            } else {
                request.components.clone()
            },
            read_only: false,
            hidden: false,
            selected: true,
            ctag: 1,
            size: 0,
            created: now,
            modified: now,
        };

        self.calendars.insert(
            key,
            CalendarEntry {
                record: record.clone(),
                objects: BTreeMap::new(),
            },
        );
        Ok(record)
    }
}

/// ## Summary
/// Storage held entirely in memory behind a `tokio` read-write lock.
///
/// Users and their initial calendars come from configuration; everything is
/// lost on restart.
#[derive(Default)]
pub struct MemoryStorage {
    state: RwLock<MemoryState>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Seeds users and their calendars from configuration.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_users(&settings.users)
    }

    #[must_use]
    pub fn with_users(users: &[UserConfig]) -> Self {
        let mut state = MemoryState::default();
        for user in users {
            state.users.insert(
                user.id.clone(),
                UserRecord {
                    id: user.id.clone(),
                    display_name: user.display_name.clone(),
                    email: user.email.clone(),
                    password_hash: user.password_hash.clone(),
                },
            );
            for calendar_id in &user.calendars {
                let request = MkcalendarRequest {
                    display_name: Some(calendar_id.clone()),
                    ..MkcalendarRequest::default()
                };
                if let Err(e) = state.insert_calendar(&user.id, calendar_id, &request) {
                    tracing::warn!(user = %user.id, calendar = %calendar_id, error = %e, "Skipping configured calendar");
                }
            }
        }
        tracing::info!(users = state.users.len(), calendars = state.calendars.len(), "Seeded in-memory storage");

        Self {
            state: RwLock::new(state),
        }
    }

    /// ## Summary
    /// Marks a calendar read-only or writable.
    ///
    /// ## Errors
    /// Returns [`StorageError::NotFound`] if the calendar does not exist.
    pub async fn set_read_only(
        &self,
        user_id: &str,
        calendar_id: &str,
        read_only: bool,
    ) -> StorageResult<()> {
        let mut state = self.state.write().await;
        let entry = state.calendar_mut(user_id, calendar_id)?;
        entry.record.read_only = read_only;
        entry.touch();
        Ok(())
    }
}

/// Returns false when the object provably cannot satisfy `filter`.
fn may_match(filter: &CompFilter, object: &ObjectRecord) -> bool {
    if filter.is_not_defined || filter.test != FilterTest::AllOf {
        return true;
    }
    filter
        .comp_filters
        .iter()
        .filter(|child| !child.is_not_defined)
        .all(|child| object.component.children_named(&child.name).next().is_some())
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_user(&self, user_id: &str) -> StorageResult<UserRecord> {
        self.state
            .read()
            .await
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("user {user_id}")))
    }

    async fn get_calendar(&self, user_id: &str, calendar_id: &str) -> StorageResult<CalendarRecord> {
        let state = self.state.read().await;
        Ok(state.calendar(user_id, calendar_id)?.record.clone())
    }

    async fn get_object(
        &self,
        user_id: &str,
        calendar_id: &str,
        object_id: &str,
    ) -> StorageResult<ObjectRecord> {
        let state = self.state.read().await;
        state
            .calendar(user_id, calendar_id)?
            .objects
            .get(object_id)
            .cloned()
            .ok_or_else(|| {
                StorageError::NotFound(format!("object {user_id}/{calendar_id}/{object_id}"))
            })
    }

    async fn get_user_calendars(&self, user_id: &str) -> StorageResult<Vec<CalendarRecord>> {
        let state = self.state.read().await;
        if !state.users.contains_key(user_id) {
            return Err(StorageError::NotFound(format!("user {user_id}")));
        }
        Ok(state
            .calendars
            .iter()
            .filter(|((owner, _), _)| owner == user_id)
            .map(|(_, entry)| entry.record.clone())
            .collect())
    }

    async fn get_object_paths_in_collection(
        &self,
        user_id: &str,
        calendar_id: &str,
    ) -> StorageResult<Vec<String>> {
        let state = self.state.read().await;
        Ok(state
            .calendar(user_id, calendar_id)?
            .objects
            .keys()
            .cloned()
            .collect())
    }

    async fn get_objects_by_filter(
        &self,
        user_id: &str,
        calendar_id: &str,
        filter: Option<&CompFilter>,
    ) -> StorageResult<Vec<ObjectRecord>> {
        let state = self.state.read().await;
        let entry = state.calendar(user_id, calendar_id)?;
        let candidates: Vec<ObjectRecord> = entry
            .objects
            .values()
            .filter(|object| filter.is_none_or(|f| may_match(f, object)))
            .cloned()
            .collect();
        tracing::debug!(
            total = entry.objects.len(),
            candidates = candidates.len(),
            "Pre-filtered calendar objects"
        );
        Ok(candidates)
    }

    async fn create_calendar(
        &self,
        user_id: &str,
        calendar_id: &str,
        request: &MkcalendarRequest,
    ) -> StorageResult<CalendarRecord> {
        self.state
            .write()
            .await
            .insert_calendar(user_id, calendar_id, request)
    }

    async fn update_object(
        &self,
        user_id: &str,
        calendar_id: &str,
        object_id: &str,
        component: Component,
    ) -> StorageResult<ObjectRecord> {
        let data = serialize_icalendar(&component);
        let etag = generate_etag(data.as_bytes());
        let now = Utc::now();

        let mut state = self.state.write().await;
        let entry = state.calendar_mut(user_id, calendar_id)?;
        let created = entry
            .objects
            .get(object_id)
            .map_or(now, |existing| existing.created);

        let record = ObjectRecord {
            user_id: user_id.to_string(),
            calendar_id: calendar_id.to_string(),
            id: object_id.to_string(),
            component,
            data,
            etag,
            created,
            modified: now,
        };
        entry.objects.insert(object_id.to_string(), record.clone());
        entry.touch();

        tracing::debug!(user_id, calendar_id, object_id, etag = %record.etag, "Stored calendar object");
        Ok(record)
    }

    async fn delete_object(
        &self,
        user_id: &str,
        calendar_id: &str,
        object_id: &str,
    ) -> StorageResult<()> {
        let mut state = self.state.write().await;
        let entry = state.calendar_mut(user_id, calendar_id)?;
        if entry.objects.remove(object_id).is_none() {
            return Err(StorageError::NotFound(format!(
                "object {user_id}/{calendar_id}/{object_id}"
            )));
        }
        entry.touch();
        Ok(())
    }

    async fn auth_user(&self, username: &str, password: &str) -> StorageResult<String> {
        let hash = {
            let state = self.state.read().await;
            match state.users.get(username) {
                Some(user) => user.password_hash.clone(),
                None => {
                    tracing::debug!(username, "Unknown user");
                    return Err(StorageError::InvalidCredentials);
                }
            }
        };

        verify_password(password, &hash).map_err(|e| {
            tracing::debug!(username, error = %e, "Password verification failed");
            StorageError::InvalidCredentials
        })?;

        Ok(username.to_string())
    }
}
