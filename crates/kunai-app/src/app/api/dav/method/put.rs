//! PUT handler for calendar objects.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use crate::app::api::dav::util::{preconditions, read_body, request_scope, set_etag, write_error};
use kunai_service::dav::put_object;

/// ## Summary
/// Stores an iCalendar body as a calendar object.
///
/// ## Side Effects
/// Creates or replaces the object and advances the calendar's ctag.
///
/// ## Errors
/// 400 for invalid iCalendar, 403 for read-only calendars or another user's
/// tree, 412 when `If-Match`/`If-None-Match` do not hold, 413 when the body
/// exceeds the size limit.
#[handler]
#[tracing::instrument(skip_all, fields(method = "PUT", path = %req.uri().path()))]
pub async fn put(req: &mut Request, res: &mut Response, depot: &Depot) {
    tracing::info!("Handling PUT request");

    let scope = match request_scope(depot) {
        Ok(scope) => scope,
        Err(e) => return write_error(res, &e),
    };
    let path = req.uri().path().to_string();
    let conditions = preconditions(req);

    let body = match read_body(req, &scope.ctx).await {
        Ok(body) => body,
        Err(e) => return write_error(res, &e),
    };

    match put_object(&scope.ctx, &path, &body, &conditions).await {
        Ok(result) => {
            res.status_code(if result.created {
                StatusCode::CREATED
            } else {
                StatusCode::NO_CONTENT
            });
            set_etag(res, &result.etag);
        }
        Err(e) => write_error(res, &e.into()),
    }
}
