//! Resolver tables, one per resource type.
//!
//! A single base table holds the resolvers every resource answers. Each
//! resource type's table is a copy of it with type-specific entries added or
//! replaced. Names missing from a table resolve to not found.

use std::collections::HashMap;
use std::sync::LazyLock;

use futures::FutureExt;
use futures::future::BoxFuture;

use kunai_rfc::rfc::dav::core::{
    Ace, CalendarTransparency, Privilege, PropertyError, PropertyName, PropertyResult,
    PropertyValue, ReportKind, ResourceTag,
};
use kunai_rfc::rfc::ical::build::serialize_icalendar;
use kunai_rfc::rfc::ical::parse::parse_icalendar;

use super::env::ResolveEnv;
use crate::resource::{Resource, ResourceType};

/// Produces one property's outcome for the bound resource.
pub type Resolver = for<'a> fn(&'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult>;

pub type ResolverTable = HashMap<PropertyName, Resolver>;

static BASE: LazyLock<ResolverTable> = LazyLock::new(|| {
    let entries: [(PropertyName, Resolver); 10] = [
        (PropertyName::Owner, owner),
        (PropertyName::CurrentUserPrincipal, current_user_principal),
        (PropertyName::PrincipalUrl, principal_url),
        (PropertyName::PrincipalCollectionSet, principal_collection_set),
        (PropertyName::CurrentUserPrivilegeSet, full_privileges),
        (PropertyName::SupportedPrivilegeSet, supported_privilege_set),
        (PropertyName::CalendarHomeSet, calendar_home_set),
        (PropertyName::CalendarUserType, calendar_user_type),
        (PropertyName::Hidden, not_hidden),
        (PropertyName::Selected, selected),
    ];
    entries.into_iter().collect()
});

static SERVICE_ROOT: LazyLock<ResolverTable> = LazyLock::new(|| {
    layered(&[
        (PropertyName::ResourceType, collection_type),
        (PropertyName::DisplayName, service_display_name),
    ])
});

static PRINCIPAL: LazyLock<ResolverTable> = LazyLock::new(|| {
    layered(&[
        (PropertyName::ResourceType, principal_type),
        (PropertyName::DisplayName, user_display_name),
        (PropertyName::CalendarUserAddressSet, calendar_user_address_set),
        (PropertyName::EmailAddressSet, email_address_set),
        (PropertyName::GroupMembership, group_membership),
        (PropertyName::AlternateUriSet, alternate_uri_set),
    ])
});

static HOME_SET: LazyLock<ResolverTable> = LazyLock::new(|| {
    layered(&[
        (PropertyName::ResourceType, collection_type),
        (PropertyName::DisplayName, home_display_name),
        (PropertyName::Acl, home_acl),
        (PropertyName::SupportedReportSet, supported_report_set),
        (PropertyName::QuotaUsedBytes, quota_used_bytes),
        (PropertyName::QuotaAvailableBytes, quota_available_bytes),
    ])
});

static COLLECTION: LazyLock<ResolverTable> = LazyLock::new(|| {
    layered(&[
        (PropertyName::ResourceType, calendar_type),
        (PropertyName::DisplayName, calendar_display_name),
        (PropertyName::CalendarDescription, calendar_description),
        (PropertyName::CalendarTimezone, calendar_timezone),
        (PropertyName::SupportedCalendarComponentSet, supported_components),
        (PropertyName::SupportedCalendarData, supported_calendar_data),
        (PropertyName::MaxResourceSize, max_resource_size),
        (PropertyName::MinDateTime, min_date_time),
        (PropertyName::MaxDateTime, max_date_time),
        (PropertyName::MaxInstances, max_instances),
        (PropertyName::MaxAttendeesPerInstance, max_attendees_per_instance),
        (PropertyName::GetCtag, calendar_ctag),
        (PropertyName::SyncToken, calendar_sync_token),
        (PropertyName::GetEtag, calendar_etag),
        (PropertyName::GetContentType, calendar_content_type),
        (PropertyName::GetLastModified, calendar_last_modified),
        (PropertyName::CreationDate, calendar_creation_date),
        (PropertyName::CurrentUserPrivilegeSet, calendar_privileges),
        (PropertyName::Acl, resource_acl),
        (PropertyName::SupportedReportSet, supported_report_set),
        (PropertyName::ScheduleCalendarTransp, schedule_calendar_transp),
        (PropertyName::Color, calendar_color),
        (PropertyName::Timezone, calendar_tzid),
        (PropertyName::Hidden, calendar_hidden),
        (PropertyName::Selected, calendar_selected),
    ])
});

static OBJECT: LazyLock<ResolverTable> = LazyLock::new(|| {
    layered(&[
        (PropertyName::ResourceType, object_type),
        (PropertyName::GetEtag, object_etag),
        (PropertyName::GetContentType, object_content_type),
        (PropertyName::GetContentLength, object_content_length),
        (PropertyName::GetLastModified, object_last_modified),
        (PropertyName::CreationDate, object_creation_date),
        (PropertyName::CalendarData, calendar_data),
        (PropertyName::CurrentUserPrivilegeSet, calendar_privileges),
        (PropertyName::Acl, resource_acl),
    ])
});

/// Copies the base table and applies `overrides` on top.
fn layered(overrides: &[(PropertyName, Resolver)]) -> ResolverTable {
    let mut table = BASE.clone();
    table.extend(overrides.iter().copied());
    table
}

/// Returns the resolver table of a resource type. `Unknown` has none.
#[must_use]
pub fn table_for(kind: ResourceType) -> Option<&'static ResolverTable> {
    match kind {
        ResourceType::ServiceRoot => Some(&SERVICE_ROOT),
        ResourceType::Principal => Some(&PRINCIPAL),
        ResourceType::HomeSet => Some(&HOME_SET),
        ResourceType::Collection => Some(&COLLECTION),
        ResourceType::Object => Some(&OBJECT),
        ResourceType::Unknown => None,
    }
}

/// Names a resource type can answer, in catalog order.
#[must_use]
pub fn supported_names(kind: ResourceType) -> Vec<PropertyName> {
    table_for(kind).map_or_else(Vec::new, |table| {
        PropertyName::ALL
            .into_iter()
            .filter(|name| table.contains_key(name))
            .collect()
    })
}

// Base

fn owner<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { env.principal_href().map(PropertyValue::Owner) }.boxed()
}

fn current_user_principal<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let user = env.ctx.principal.as_deref().ok_or(PropertyError::NotFound)?;
        env.href_of(&Resource::principal(user))
            .map(PropertyValue::CurrentUserPrincipal)
    }
    .boxed()
}

fn principal_url<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { env.principal_href().map(PropertyValue::PrincipalUrl) }.boxed()
}

fn principal_collection_set<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let root = env.href_of(&Resource::service_root())?;
        Ok(PropertyValue::PrincipalCollectionSet(vec![root]))
    }
    .boxed()
}

fn full_privileges<'a>(_env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        Ok(PropertyValue::CurrentUserPrivilegeSet(
            Privilege::READ_WRITE.to_vec(),
        ))
    }
    .boxed()
}

fn supported_privilege_set<'a>(_env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::SupportedPrivilegeSet(Privilege::READ_WRITE.to_vec())) }.boxed()
}

fn calendar_home_set<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        env.href_of(&Resource::home_set(env.user_id()?))
            .map(PropertyValue::CalendarHomeSet)
    }
    .boxed()
}

fn calendar_user_type<'a>(_env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::CalendarUserType("INDIVIDUAL".to_string())) }.boxed()
}

fn not_hidden<'a>(_env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::Hidden(false)) }.boxed()
}

fn selected<'a>(_env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::Selected(true)) }.boxed()
}

fn supported_report_set<'a>(_env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::SupportedReportSet(ReportKind::ALL.to_vec())) }.boxed()
}

fn collection_type<'a>(_env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::ResourceType(vec![ResourceTag::Collection])) }.boxed()
}

// Service root

fn service_display_name<'a>(_env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::DisplayName("kunai".to_string())) }.boxed()
}

// Principal

fn principal_type<'a>(_env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::ResourceType(vec![ResourceTag::Principal])) }.boxed()
}

fn user_display_name<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let user = env.user().await?;
        Ok(PropertyValue::DisplayName(user.display_name.clone()))
    }
    .boxed()
}

fn calendar_user_address_set<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let user = env.user().await?;
        Ok(PropertyValue::CalendarUserAddressSet(vec![
            format!("mailto:{}", user.email),
            env.principal_href()?,
        ]))
    }
    .boxed()
}

fn email_address_set<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let user = env.user().await?;
        Ok(PropertyValue::EmailAddressSet(vec![user.email.clone()]))
    }
    .boxed()
}

fn group_membership<'a>(_env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::GroupMembership(Vec::new())) }.boxed()
}

fn alternate_uri_set<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let user = env.user().await?;
        Ok(PropertyValue::AlternateUriSet(vec![format!(
            "mailto:{}",
            user.email
        )]))
    }
    .boxed()
}

// Home set

fn home_display_name<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let user = env.user().await?;
        Ok(PropertyValue::DisplayName(format!(
            "{} calendars",
            user.display_name
        )))
    }
    .boxed()
}

fn home_acl<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        Ok(PropertyValue::Acl(vec![Ace {
            principal_href: env.principal_href()?,
            grant: Privilege::READ_WRITE.to_vec(),
            protected: true,
        }]))
    }
    .boxed()
}

async fn used_bytes(env: &ResolveEnv<'_>) -> Result<u64, PropertyError> {
    let calendars = env.calendars().await?;
    Ok(calendars
        .iter()
        .fold(0_u64, |total, calendar| total.saturating_add(calendar.size)))
}

fn quota_used_bytes<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { used_bytes(env).await.map(PropertyValue::QuotaUsedBytes) }.boxed()
}

fn quota_available_bytes<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let used = used_bytes(env).await?;
        Ok(PropertyValue::QuotaAvailableBytes(
            env.ctx.config.quota_bytes.saturating_sub(used),
        ))
    }
    .boxed()
}

// Collection

fn calendar_type<'a>(_env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        Ok(PropertyValue::ResourceType(vec![
            ResourceTag::Collection,
            ResourceTag::Calendar,
        ]))
    }
    .boxed()
}

fn calendar_display_name<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let calendar = env.calendar().await?;
        calendar
            .display_name
            .clone()
            .map(PropertyValue::DisplayName)
            .ok_or(PropertyError::NotFound)
    }
    .boxed()
}

fn calendar_description<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let calendar = env.calendar().await?;
        calendar
            .description
            .clone()
            .map(PropertyValue::CalendarDescription)
            .ok_or(PropertyError::NotFound)
    }
    .boxed()
}

fn calendar_timezone<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let calendar = env.calendar().await?;
        calendar
            .timezone
            .clone()
            .map(PropertyValue::CalendarTimezone)
            .ok_or(PropertyError::NotFound)
    }
    .boxed()
}

/// The stored zone as a bare TZID; a VTIMEZONE body yields its `TZID`.
fn calendar_tzid<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let calendar = env.calendar().await?;
        let stored = calendar.timezone.as_deref().ok_or(PropertyError::NotFound)?;
        if !stored.contains("BEGIN:") {
            return Ok(PropertyValue::Timezone(stored.trim().to_string()));
        }

        let parsed = parse_icalendar(stored).map_err(|e| {
            tracing::debug!(error = %e, "Stored calendar timezone does not parse");
            PropertyError::NotFound
        })?;
        std::iter::once(&parsed)
            .chain(parsed.children.iter())
            .filter(|c| c.name == "VTIMEZONE")
            .find_map(|c| c.get_property("TZID"))
            .map(|tzid| PropertyValue::Timezone(tzid.value.clone()))
            .ok_or(PropertyError::NotFound)
    }
    .boxed()
}

fn supported_components<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let calendar = env.calendar().await?;
        Ok(PropertyValue::SupportedCalendarComponentSet(
            calendar.components.clone(),
        ))
    }
    .boxed()
}

fn supported_calendar_data<'a>(_env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::SupportedCalendarData) }.boxed()
}

fn max_resource_size<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::MaxResourceSize(env.ctx.config.max_resource_size)) }.boxed()
}

fn min_date_time<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::MinDateTime(env.ctx.config.min_date_time)) }.boxed()
}

fn max_date_time<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::MaxDateTime(env.ctx.config.max_date_time)) }.boxed()
}

fn max_instances<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::MaxInstances(env.ctx.config.max_instances)) }.boxed()
}

fn max_attendees_per_instance<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        Ok(PropertyValue::MaxAttendeesPerInstance(
            env.ctx.config.max_attendees_per_instance,
        ))
    }
    .boxed()
}

fn calendar_ctag<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::GetCtag(env.calendar().await?.ctag())) }.boxed()
}

fn calendar_sync_token<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::SyncToken(env.calendar().await?.sync_token())) }.boxed()
}

fn calendar_etag<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::GetEtag(env.calendar().await?.etag())) }.boxed()
}

fn calendar_content_type<'a>(_env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::GetContentType("text/calendar".to_string())) }.boxed()
}

fn calendar_last_modified<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::GetLastModified(env.calendar().await?.modified)) }.boxed()
}

fn calendar_creation_date<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::CreationDate(env.calendar().await?.created)) }.boxed()
}

/// Privileges on a calendar or one of its objects follow the calendar's
/// read-only flag.
fn calendar_privileges<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let calendar = env.calendar().await?;
        Ok(PropertyValue::CurrentUserPrivilegeSet(Privilege::for_access(
            calendar.read_only,
        )))
    }
    .boxed()
}

/// ACL of a calendar or object, bound to the resource's own href.
fn resource_acl<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let calendar = env.calendar().await?;
        Ok(PropertyValue::Acl(vec![Ace {
            principal_href: env.href.clone(),
            grant: Privilege::for_access(calendar.read_only),
            protected: true,
        }]))
    }
    .boxed()
}

fn schedule_calendar_transp<'a>(_env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        Ok(PropertyValue::ScheduleCalendarTransp(
            CalendarTransparency::Opaque,
        ))
    }
    .boxed()
}

fn calendar_color<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let calendar = env.calendar().await?;
        calendar
            .color
            .clone()
            .map(PropertyValue::Color)
            .ok_or(PropertyError::NotFound)
    }
    .boxed()
}

fn calendar_hidden<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::Hidden(env.calendar().await?.hidden)) }.boxed()
}

fn calendar_selected<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::Selected(env.calendar().await?.selected)) }.boxed()
}

// Object

fn object_type<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let object = env.object().await?;
        Ok(PropertyValue::ResourceType(
            object.kind().map(ResourceTag::Component).into_iter().collect(),
        ))
    }
    .boxed()
}

fn object_etag<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::GetEtag(env.object().await?.etag.clone())) }.boxed()
}

fn object_content_type<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let object = env.object().await?;
        let content_type = match object.kind() {
            Some(kind) => format!(
                "text/calendar; charset=utf-8; component={}",
                kind.as_str().to_ascii_lowercase()
            ),
            None => "text/calendar; charset=utf-8".to_string(),
        };
        Ok(PropertyValue::GetContentType(content_type))
    }
    .boxed()
}

fn object_content_length<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::GetContentLength(env.object().await?.size())) }.boxed()
}

fn object_last_modified<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::GetLastModified(env.object().await?.modified)) }.boxed()
}

fn object_creation_date<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move { Ok(PropertyValue::CreationDate(env.object().await?.created)) }.boxed()
}

fn calendar_data<'a>(env: &'a ResolveEnv<'a>) -> BoxFuture<'a, PropertyResult> {
    async move {
        let object = env.object().await?;
        Ok(PropertyValue::CalendarData(serialize_icalendar(
            &object.component,
        )))
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_copies_the_base() {
        for kind in [
            ResourceType::ServiceRoot,
            ResourceType::Principal,
            ResourceType::HomeSet,
            ResourceType::Collection,
            ResourceType::Object,
        ] {
            let table = table_for(kind).expect("table");
            for name in BASE.keys() {
                assert!(table.contains_key(name), "{kind:?} lacks {name}");
            }
        }
        assert!(table_for(ResourceType::Unknown).is_none());
    }

    #[test]
    fn calendar_data_is_object_only() {
        assert!(supported_names(ResourceType::Object).contains(&PropertyName::CalendarData));
        assert!(!supported_names(ResourceType::Collection).contains(&PropertyName::CalendarData));
        assert!(!supported_names(ResourceType::HomeSet).contains(&PropertyName::GetEtag));
    }

    #[test]
    fn names_follow_catalog_order() {
        let names = supported_names(ResourceType::ServiceRoot);
        assert_eq!(names.first(), Some(&PropertyName::DisplayName));
        assert_eq!(names.len(), 12);
    }
}
