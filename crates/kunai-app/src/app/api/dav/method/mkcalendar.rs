//! MKCALENDAR handler.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use crate::app::api::dav::util::{read_body, request_scope, write_error};
use kunai_service::dav::make_calendar;

/// ## Summary
/// Creates a calendar collection.
///
/// ## Errors
/// 400 for a malformed body, 403 for another user's tree, 405 if the
/// calendar exists or the path is not a calendar path.
#[handler]
#[tracing::instrument(skip_all, fields(method = "MKCALENDAR", path = %req.uri().path()))]
pub async fn mkcalendar(req: &mut Request, res: &mut Response, depot: &Depot) {
    tracing::info!("Handling MKCALENDAR request");

    let scope = match request_scope(depot) {
        Ok(scope) => scope,
        Err(e) => return write_error(res, &e),
    };
    let path = req.uri().path().to_string();
    let body = match read_body(req, &scope.ctx).await {
        Ok(body) => body,
        Err(e) => return write_error(res, &e),
    };

    match make_calendar(&scope.ctx, &path, &body).await {
        Ok(calendar) => {
            tracing::debug!(calendar = %calendar.id, "MKCALENDAR succeeded");
            res.status_code(StatusCode::CREATED);
        }
        Err(e) => write_error(res, &e.into()),
    }
}
