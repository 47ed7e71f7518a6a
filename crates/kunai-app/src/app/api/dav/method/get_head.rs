//! GET and HEAD handlers for calendar objects.

use salvo::http::{HeaderValue, StatusCode, header};
use salvo::{Depot, Request, Response, handler};

use crate::app::api::dav::util::{request_scope, set_etag, write_error};
use kunai_core::constants::ICALENDAR_CONTENT_TYPE;
use kunai_service::dav::get_object;

/// ## Summary
/// Returns a calendar object's iCalendar text.
///
/// ## Errors
/// 404 for missing objects, 403 for another user's tree, 405 for anything
/// that is not an object.
#[handler]
#[tracing::instrument(skip_all, fields(method = "GET", path = %req.uri().path()))]
pub async fn get(req: &mut Request, res: &mut Response, depot: &Depot) {
    serve(req, res, depot, true).await;
}

/// ## Summary
/// Like GET, without the body.
#[handler]
#[tracing::instrument(skip_all, fields(method = "HEAD", path = %req.uri().path()))]
pub async fn head(req: &mut Request, res: &mut Response, depot: &Depot) {
    serve(req, res, depot, false).await;
}

async fn serve(req: &Request, res: &mut Response, depot: &Depot, with_body: bool) {
    let scope = match request_scope(depot) {
        Ok(scope) => scope,
        Err(e) => return write_error(res, &e),
    };

    let object = match get_object(&scope.ctx, req.uri().path()).await {
        Ok(object) => object,
        Err(e) => return write_error(res, &e.into()),
    };

    let if_none_match = req
        .headers()
        .get(header::IF_NONE_MATCH)
        .and_then(|h| h.to_str().ok());
    if if_none_match.is_some_and(|tag| tag.trim() == object.etag || tag.trim() == "*") {
        res.status_code(StatusCode::NOT_MODIFIED);
        set_etag(res, &object.etag);
        return;
    }

    res.status_code(StatusCode::OK);
    set_etag(res, &object.etag);
    #[expect(
        clippy::let_underscore_must_use,
        reason = "Header addition failure is non-fatal"
    )]
    let _ = res.add_header(
        header::CONTENT_TYPE,
        HeaderValue::from_static(ICALENDAR_CONTENT_TYPE),
        true,
    );
    #[expect(
        clippy::let_underscore_must_use,
        reason = "Header addition failure is non-fatal"
    )]
    let _ = res.add_header(header::CONTENT_LENGTH, object.data.len(), true);
    #[expect(
        clippy::let_underscore_must_use,
        reason = "Header addition failure is non-fatal"
    )]
    let _ = res.add_header(
        header::LAST_MODIFIED,
        object
            .modified
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string(),
        true,
    );

    if with_body {
        res.body(object.data);
    }
}
