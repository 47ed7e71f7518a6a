//! Calendar object resources: GET, PUT and DELETE.

use kunai_rfc::rfc::ical::core::{Component, ComponentKind};
use kunai_rfc::rfc::ical::parse::parse_icalendar;

use crate::dav::context::DavContext;
use crate::error::{ServiceError, ServiceResult};
use crate::resource::{Resource, ResourceType};
use crate::storage::{ObjectRecord, StorageError};

/// Conditional headers of a write request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preconditions {
    /// `If-Match`: an `ETag` or `*`.
    pub if_match: Option<String>,
    /// `If-None-Match`: only `*` is meaningful for writes.
    pub if_none_match: Option<String>,
}

/// Result of a PUT operation on a calendar object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectResult {
    /// `ETag` of the stored object.
    pub etag: String,
    /// Whether the object was newly created.
    pub created: bool,
}

/// Ids of an object resource: user, calendar and object.
struct ObjectIds<'r> {
    user: &'r str,
    calendar: &'r str,
    object: &'r str,
}

fn object_ids<'r>(resource: &'r Resource, method: &str) -> ServiceResult<ObjectIds<'r>> {
    match (
        resource.kind,
        resource.user_id(),
        resource.calendar_id(),
        resource.object_id(),
    ) {
        (ResourceType::Object, Some(user), Some(calendar), Some(object)) => Ok(ObjectIds {
            user,
            calendar,
            object,
        }),
        _ => Err(ServiceError::MethodNotAllowed(format!(
            "{method} is only supported on calendar objects, not {resource}"
        ))),
    }
}

/// ## Summary
/// Loads the object at `path`.
///
/// ## Errors
/// Returns an error if the path does not address an object of the principal,
/// or the object does not exist.
#[tracing::instrument(skip(ctx))]
pub async fn get_object(ctx: &DavContext, path: &str) -> ServiceResult<ObjectRecord> {
    let resource = ctx.codec.parse_path(path)?;
    ctx.ensure_owner(&resource)?;
    let ids = object_ids(&resource, "GET")?;

    Ok(ctx
        .storage
        .get_object(ids.user, ids.calendar, ids.object)
        .await?)
}

/// ## Summary
/// Stores an iCalendar body at `path`, creating or replacing the object.
///
/// The body is parsed and validated as a calendar object resource before it
/// is stored; the `ETag` is computed over the stored serialization.
///
/// ## Errors
/// Returns an error if the body is too large or not a valid calendar object,
/// the calendar is missing or read-only, a precondition fails, or storage
/// fails.
#[tracing::instrument(skip(ctx, body), fields(body_len = body.len()))]
pub async fn put_object(
    ctx: &DavContext,
    path: &str,
    body: &str,
    preconditions: &Preconditions,
) -> ServiceResult<PutObjectResult> {
    let limit = usize::try_from(ctx.config.max_resource_size).unwrap_or(usize::MAX);
    if body.len() > limit {
        return Err(ServiceError::ResourceTooLarge(body.len()));
    }

    let resource = ctx.codec.parse_path(path)?;
    ctx.ensure_owner(&resource)?;
    let ids = object_ids(&resource, "PUT")?;

    let calendar = ctx.storage.get_calendar(ids.user, ids.calendar).await?;
    if calendar.read_only {
        return Err(ServiceError::Forbidden(format!(
            "calendar {} is read-only",
            calendar.id
        )));
    }

    let component = parse_icalendar(body)?;
    let kind = validate_object(&component)?;
    if !calendar.components.contains(&kind) {
        return Err(ServiceError::ValidationError(format!(
            "calendar {} does not accept {kind}",
            calendar.id
        )));
    }

    let existing = existing_etag(ctx, &ids).await?;
    check_preconditions(existing.as_deref(), preconditions)?;

    let record = ctx
        .storage
        .update_object(ids.user, ids.calendar, ids.object, component)
        .await?;
    let created = existing.is_none();
    tracing::debug!(etag = %record.etag, created, "Stored calendar object");

    Ok(PutObjectResult {
        etag: record.etag,
        created,
    })
}

/// ## Summary
/// Deletes the object at `path`.
///
/// ## Errors
/// Returns an error if the path does not address an existing object of the
/// principal, the calendar is read-only, or `If-Match` does not hold.
#[tracing::instrument(skip(ctx))]
pub async fn delete_object(
    ctx: &DavContext,
    path: &str,
    preconditions: &Preconditions,
) -> ServiceResult<()> {
    let resource = ctx.codec.parse_path(path)?;
    ctx.ensure_owner(&resource)?;
    let ids = object_ids(&resource, "DELETE")?;

    let calendar = ctx.storage.get_calendar(ids.user, ids.calendar).await?;
    if calendar.read_only {
        return Err(ServiceError::Forbidden(format!(
            "calendar {} is read-only",
            calendar.id
        )));
    }

    let existing = existing_etag(ctx, &ids).await?;
    if existing.is_none() {
        return Err(StorageError::NotFound(resource.to_string()).into());
    }
    check_preconditions(existing.as_deref(), preconditions)?;

    ctx.storage
        .delete_object(ids.user, ids.calendar, ids.object)
        .await?;
    Ok(())
}

async fn existing_etag(ctx: &DavContext, ids: &ObjectIds<'_>) -> ServiceResult<Option<String>> {
    match ctx.storage.get_object(ids.user, ids.calendar, ids.object).await {
        Ok(object) => Ok(Some(object.etag)),
        Err(StorageError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// ## Summary
/// Evaluates `If-Match` and `If-None-Match` against the current `ETag`.
///
/// ## Errors
/// Returns [`ServiceError::PreconditionFailed`] if either header does not hold.
pub fn check_preconditions(current: Option<&str>, preconditions: &Preconditions) -> ServiceResult<()> {
    if let Some(if_none_match) = preconditions.if_none_match.as_deref()
        && current.is_some()
        && (if_none_match.trim() == "*" || etag_listed(if_none_match, current))
    {
        return Err(ServiceError::PreconditionFailed(
            "resource already exists".to_string(),
        ));
    }

    if let Some(if_match) = preconditions.if_match.as_deref() {
        let holds = match current {
            None => false,
            Some(_) if if_match.trim() == "*" => true,
            Some(_) => etag_listed(if_match, current),
        };
        if !holds {
            tracing::debug!(?current, %if_match, "If-Match precondition failed");
            return Err(ServiceError::PreconditionFailed("ETag mismatch".to_string()));
        }
    }

    Ok(())
}

fn etag_listed(header: &str, current: Option<&str>) -> bool {
    let Some(current) = current else {
        return false;
    };
    let bare = |tag: &str| tag.trim().trim_start_matches("W/").trim_matches('"').to_string();
    let current = bare(current);
    header.split(',').any(|tag| bare(tag) == current)
}

/// ## Summary
/// Checks that `component` is a single calendar object resource.
///
/// A `VCALENDAR` must hold at least one component besides time zones, all of
/// one kind and sharing one `UID` (RFC 4791 §4.1).
///
/// ## Errors
/// Returns [`ServiceError::ValidationError`] describing the first violation.
pub fn validate_object(component: &Component) -> ServiceResult<ComponentKind> {
    if component.kind != Some(ComponentKind::Calendar) {
        return Err(ServiceError::ValidationError(format!(
            "expected VCALENDAR, found {}",
            component.name
        )));
    }

    let mut members = component
        .children
        .iter()
        .filter(|c| c.kind != Some(ComponentKind::Timezone));
    let Some(first) = members.next() else {
        return Err(ServiceError::ValidationError(
            "calendar object holds no components".to_string(),
        ));
    };
    let Some(kind) = first.kind else {
        return Err(ServiceError::ValidationError(format!(
            "unsupported component {}",
            first.name
        )));
    };
    let Some(uid) = first.uid() else {
        return Err(ServiceError::ValidationError(format!("{kind} without UID")));
    };

    for other in members {
        if other.kind != Some(kind) {
            return Err(ServiceError::ValidationError(format!(
                "mixed component types {kind} and {}",
                other.name
            )));
        }
        if other.uid() != Some(uid) {
            return Err(ServiceError::ValidationError(
                "components carry different UIDs".to_string(),
            ));
        }
    }

    Ok(kind)
}
