//! REPORT: `calendar-query` and `calendar-multiget`.

use kunai_rfc::rfc::dav::build::{build_status_response, empty_multistatus, merge_multistatus};
use kunai_rfc::rfc::dav::core::{
    CalendarMultiget, CalendarQuery, PropfindRequest, ReportRequest, Status,
};
use kunai_rfc::rfc::dav::parse::parse_report;
use kunai_rfc::rfc::xml::Element;

use crate::caldav::{MatchContext, matches};
use crate::dav::context::DavContext;
use crate::dav::resolve::{ResolveEnv, render_response};
use crate::error::{ServiceError, ServiceResult};
use crate::resource::{Resource, ResourceType};
use crate::storage::{ObjectRecord, StorageError};

/// ## Summary
/// Answers a REPORT request body for `path`.
///
/// ## Errors
/// Returns an error for a malformed body, an unsupported report, a bad path,
/// a resource the principal may not access, a storage failure, or
/// cancellation.
#[tracing::instrument(skip(ctx, body), fields(body_len = body.len()))]
pub async fn report(ctx: &DavContext, path: &str, body: &str) -> ServiceResult<Element> {
    let request = parse_report(body)?;
    let resource = ctx.codec.parse_path(path)?;
    ctx.ensure_owner(&resource)?;
    ctx.ensure_exists(&resource).await?;

    match &request {
        ReportRequest::CalendarQuery(query) => calendar_query(ctx, &resource, query).await,
        ReportRequest::CalendarMultiget(multiget) => calendar_multiget(ctx, multiget).await,
    }
}

/// ## Summary
/// Evaluates a calendar-query below `resource`.
///
/// A calendar queries its own objects, a home set every calendar of its user
/// and an object only itself. Other resources hold no calendar data.
///
/// ## Errors
/// Returns an error if candidates cannot be loaded or the request is
/// cancelled.
pub async fn calendar_query(
    ctx: &DavContext,
    resource: &Resource,
    query: &CalendarQuery,
) -> ServiceResult<Element> {
    let candidates = query_candidates(ctx, resource, query).await?;
    let match_ctx = MatchContext::from_config(&ctx.config);

    let mut documents = Vec::new();
    for object in candidates {
        ctx.check_cancelled()?;
        let keep = query
            .filter
            .as_ref()
            .is_none_or(|filter| matches(filter, &object.component, &match_ctx));
        if keep {
            documents.push(Some(render_object(ctx, object, &query.props).await?));
        }
    }

    tracing::debug!(matched = documents.len(), "Calendar query evaluated");
    finish(documents)
}

async fn query_candidates(
    ctx: &DavContext,
    resource: &Resource,
    query: &CalendarQuery,
) -> ServiceResult<Vec<ObjectRecord>> {
    let filter = query.filter.as_ref();
    let (Some(user_id), kind) = (resource.user_id(), resource.kind) else {
        return Ok(Vec::new());
    };

    let candidates = match (kind, resource.calendar_id(), resource.object_id()) {
        (ResourceType::Collection, Some(calendar_id), _) => {
            ctx.storage
                .get_objects_by_filter(user_id, calendar_id, filter)
                .await?
        }
        (ResourceType::HomeSet, _, _) => {
            let mut all = Vec::new();
            for calendar in ctx.storage.get_user_calendars(user_id).await? {
                ctx.check_cancelled()?;
                all.extend(
                    ctx.storage
                        .get_objects_by_filter(user_id, &calendar.id, filter)
                        .await?,
                );
            }
            all
        }
        (ResourceType::Object, Some(calendar_id), Some(object_id)) => {
            vec![ctx.storage.get_object(user_id, calendar_id, object_id).await?]
        }
        _ => Vec::new(),
    };
    Ok(candidates)
}

/// ## Summary
/// Resolves every href of a calendar-multiget.
///
/// Hrefs that do not parse, do not address an object, or address a missing
/// object produce a `404` entry. Objects of another user produce `403`.
///
/// ## Errors
/// Returns an error on a storage failure other than a missing object, or on
/// cancellation.
pub async fn calendar_multiget(
    ctx: &DavContext,
    multiget: &CalendarMultiget,
) -> ServiceResult<Element> {
    let mut documents = Vec::with_capacity(multiget.hrefs.len());
    for href in &multiget.hrefs {
        ctx.check_cancelled()?;
        documents.push(Some(multiget_entry(ctx, href, &multiget.props).await?));
    }
    finish(documents)
}

async fn multiget_entry(
    ctx: &DavContext,
    href: &str,
    props: &PropfindRequest,
) -> ServiceResult<Element> {
    let resource = match ctx.codec.parse_path(href) {
        Ok(resource) if resource.kind == ResourceType::Object => resource,
        _ => {
            tracing::debug!(%href, "Multiget href does not address an object");
            return Ok(build_status_response(href, Status::NotFound));
        }
    };
    match ctx.ensure_owner(&resource) {
        Ok(()) => {}
        Err(ServiceError::Forbidden(_)) => {
            return Ok(build_status_response(href, Status::Forbidden));
        }
        Err(e) => return Err(e),
    }

    let (Some(user_id), Some(calendar_id), Some(object_id)) = (
        resource.user_id(),
        resource.calendar_id(),
        resource.object_id(),
    ) else {
        return Ok(build_status_response(href, Status::NotFound));
    };

    match ctx.storage.get_object(user_id, calendar_id, object_id).await {
        Ok(object) => render_object(ctx, object, props).await,
        Err(StorageError::NotFound(_)) => Ok(build_status_response(href, Status::NotFound)),
        Err(e) => Err(e.into()),
    }
}

async fn render_object(
    ctx: &DavContext,
    object: ObjectRecord,
    props: &PropfindRequest,
) -> ServiceResult<Element> {
    let resource = Resource::object(&object.user_id, &object.calendar_id, &object.id);
    let href = ctx.codec.encode_path(&resource)?;
    let resource = resource.with_uri(href.clone());
    let env = ResolveEnv::new(ctx, &resource, href).with_object(object);
    Ok(render_response(&env, props).await)
}

fn finish(documents: Vec<Option<Element>>) -> ServiceResult<Element> {
    if documents.is_empty() {
        return Ok(empty_multistatus());
    }
    Ok(merge_multistatus(documents)?)
}
