//! PROPFIND handler.

use salvo::{Depot, Request, Response, handler};

use crate::app::api::dav::util::{read_body, request_scope, write_error, write_multistatus};
use kunai_rfc::rfc::dav::core::Depth;
use kunai_service::dav::propfind as run_propfind;

/// ## Summary
/// Handles PROPFIND requests.
///
/// A missing or unknown `Depth` header means `infinity`.
///
/// ## Side Effects
/// Returns a 207 Multi-Status XML response.
///
/// ## Errors
/// 400 for malformed bodies, 404 for missing resources, 403 for another
/// user's tree, 500 for storage failures during the walk.
#[handler]
#[tracing::instrument(skip_all, fields(method = "PROPFIND", path = %req.uri().path()))]
pub async fn propfind(req: &mut Request, res: &mut Response, depot: &Depot) {
    tracing::info!("Handling PROPFIND request");

    let depth = req
        .headers()
        .get("Depth")
        .and_then(|h| h.to_str().ok())
        .and_then(Depth::from_header)
        .unwrap_or_default();
    tracing::debug!(%depth, "Depth header parsed");

    let scope = match request_scope(depot) {
        Ok(scope) => scope,
        Err(e) => return write_error(res, &e),
    };
    let path = req.uri().path().to_string();
    let body = match read_body(req, &scope.ctx).await {
        Ok(body) => body,
        Err(e) => return write_error(res, &e),
    };

    match run_propfind(&scope.ctx, &path, depth, &body).await {
        Ok(document) => write_multistatus(res, &document),
        Err(e) => write_error(res, &e.into()),
    }
}
