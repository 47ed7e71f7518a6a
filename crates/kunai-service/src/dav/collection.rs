//! Calendar collection creation (MKCALENDAR).

use kunai_rfc::rfc::dav::parse::parse_mkcalendar;

use crate::dav::context::DavContext;
use crate::error::{ServiceError, ServiceResult};
use crate::resource::ResourceType;
use crate::storage::CalendarRecord;

/// ## Summary
/// Creates the calendar addressed by `path` with the initial properties of
/// an optional MKCALENDAR body.
///
/// ## Errors
/// Returns an error if the body is malformed, the path does not address a
/// calendar of the principal, or the calendar already exists.
#[tracing::instrument(skip(ctx, body), fields(body_len = body.len()))]
pub async fn make_calendar(ctx: &DavContext, path: &str, body: &str) -> ServiceResult<CalendarRecord> {
    let request = parse_mkcalendar(body)?;
    let resource = ctx.codec.parse_path(path)?;
    ctx.ensure_owner(&resource)?;

    let (ResourceType::Collection, Some(user_id), Some(calendar_id)) =
        (resource.kind, resource.user_id(), resource.calendar_id())
    else {
        return Err(ServiceError::MethodNotAllowed(format!(
            "MKCALENDAR is only supported on calendar paths, not {resource}"
        )));
    };

    let record = ctx
        .storage
        .create_calendar(user_id, calendar_id, &request)
        .await?;
    tracing::info!(user = %user_id, calendar = %calendar_id, "Calendar created");
    Ok(record)
}
