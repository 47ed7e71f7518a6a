use salvo::http::{HeaderValue, StatusCode, header};
use salvo::{Depot, Request, Response};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::config::get_config_from_depot;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::get_principal_from_depot;
use crate::storage_handler::get_storage_from_depot;
use kunai_core::constants::XML_CONTENT_TYPE;
use kunai_rfc::rfc::xml::{Element, serialize_document};
use kunai_service::dav::{DavContext, Preconditions};

/// ## Summary
/// A request's DAV context, cancelled when the handler future is dropped.
pub struct RequestScope {
    pub ctx: DavContext,
    _cancel_on_drop: DropGuard,
}

/// ## Summary
/// Builds the DAV context for this request from the depot.
///
/// ## Errors
/// Returns an error if storage or configuration were not injected.
pub fn request_scope(depot: &Depot) -> AppResult<RequestScope> {
    let storage = get_storage_from_depot(depot)?;
    let settings = get_config_from_depot(depot)?;
    let token = CancellationToken::new();

    let mut ctx = DavContext::new(storage, settings.dav.clone()).with_cancellation(token.clone());
    ctx.principal = get_principal_from_depot(depot);

    Ok(RequestScope {
        ctx,
        _cancel_on_drop: token.drop_guard(),
    })
}

/// ## Summary
/// Reads the request body as UTF-8, bounded by the configured resource size.
///
/// ## Errors
/// Returns [`AppError::BodyError`] if the body cannot be read, is too large,
/// or is not UTF-8.
pub async fn read_body(req: &mut Request, ctx: &DavContext) -> AppResult<String> {
    let limit = usize::try_from(ctx.config.max_resource_size).unwrap_or(usize::MAX);
    let bytes = req
        .payload_with_max_size(limit)
        .await
        .map_err(|e| AppError::BodyError(e.to_string()))?;
    tracing::debug!(bytes = bytes.len(), "Request body read successfully");

    String::from_utf8(bytes.to_vec()).map_err(|e| AppError::BodyError(e.to_string()))
}

/// Reads `If-Match` and `If-None-Match`.
#[must_use]
pub fn preconditions(req: &Request) -> Preconditions {
    let header_text = |name: header::HeaderName| {
        req.headers()
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(String::from)
    };
    Preconditions {
        if_match: header_text(header::IF_MATCH),
        if_none_match: header_text(header::IF_NONE_MATCH),
    }
}

/// ## Summary
/// Writes a plain error response with the error's status.
pub fn write_error(res: &mut Response, err: &AppError) {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!(error = %err, %status, "Request failed");
    } else {
        tracing::debug!(error = %err, %status, "Request rejected");
    }
    res.status_code(status);
    res.body(err.to_string());
}

/// ## Summary
/// Serializes a multistatus document as a `207 Multi-Status` response.
pub fn write_multistatus(res: &mut Response, document: &Element) {
    let xml = match serialize_document(document) {
        Ok(xml) => xml,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize multistatus");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    res.status_code(StatusCode::MULTI_STATUS);
    #[expect(
        clippy::let_underscore_must_use,
        reason = "Header addition failure is non-fatal"
    )]
    let _ = res.add_header(
        header::CONTENT_TYPE,
        HeaderValue::from_static(XML_CONTENT_TYPE),
        true,
    );
    res.body(xml);
}

/// ## Summary
/// Sets the `ETag` header, ignoring values that are not valid header text.
pub fn set_etag(res: &mut Response, etag: &str) {
    match HeaderValue::from_str(etag) {
        Ok(value) => {
            #[expect(
                clippy::let_underscore_must_use,
                reason = "Header addition failure is non-fatal"
            )]
            let _ = res.add_header(header::ETAG, value, true);
        }
        Err(e) => tracing::warn!(error = %e, %etag, "ETag is not a valid header value"),
    }
}
