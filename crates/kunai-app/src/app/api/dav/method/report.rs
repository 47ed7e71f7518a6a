//! REPORT handler.

use salvo::{Depot, Request, Response, handler};

use crate::app::api::dav::util::{read_body, request_scope, write_error, write_multistatus};
use kunai_service::dav::report as run_report;

/// ## Summary
/// Handles `calendar-query` and `calendar-multiget` REPORTs.
///
/// ## Errors
/// 400 for malformed bodies and unsupported reports, 404 for missing
/// resources, 403 for another user's tree.
#[handler]
#[tracing::instrument(skip_all, fields(method = "REPORT", path = %req.uri().path()))]
pub async fn report(req: &mut Request, res: &mut Response, depot: &Depot) {
    tracing::info!("Handling REPORT request");

    let scope = match request_scope(depot) {
        Ok(scope) => scope,
        Err(e) => return write_error(res, &e),
    };
    let path = req.uri().path().to_string();
    let body = match read_body(req, &scope.ctx).await {
        Ok(body) => body,
        Err(e) => return write_error(res, &e),
    };

    match run_report(&scope.ctx, &path, &body).await {
        Ok(document) => write_multistatus(res, &document),
        Err(e) => write_error(res, &e.into()),
    }
}
