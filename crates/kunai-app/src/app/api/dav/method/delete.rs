//! DELETE handler for calendar objects.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use crate::app::api::dav::util::{preconditions, request_scope, write_error};
use kunai_service::dav::delete_object;

/// ## Summary
/// Deletes a calendar object.
///
/// ## Errors
/// 404 if the object does not exist, 403 for read-only calendars or another
/// user's tree, 412 when `If-Match` does not hold.
#[handler]
#[tracing::instrument(skip_all, fields(method = "DELETE", path = %req.uri().path()))]
pub async fn delete(req: &mut Request, res: &mut Response, depot: &Depot) {
    tracing::info!("Handling DELETE request");

    let scope = match request_scope(depot) {
        Ok(scope) => scope,
        Err(e) => return write_error(res, &e),
    };

    match delete_object(&scope.ctx, req.uri().path(), &preconditions(req)).await {
        Ok(()) => {
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(e) => write_error(res, &e.into()),
    }
}
