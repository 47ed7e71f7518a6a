//! OPTIONS method handler.

use salvo::http::HeaderValue;
use salvo::{Request, Response, handler};

use kunai_core::constants::DAV_COMPLIANCE;

/// Methods served below the DAV prefix.
pub const ALLOW: &str = "OPTIONS, GET, HEAD, PUT, DELETE, PROPFIND, REPORT, MKCALENDAR";

/// ## Summary
/// Handles OPTIONS requests. No authentication is required.
///
/// ## Side Effects
/// Sets the `Allow` and `DAV` headers on the response.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn options(req: &mut Request, res: &mut Response) {
    tracing::debug!("Handling OPTIONS request");

    #[expect(
        clippy::let_underscore_must_use,
        reason = "Header addition failure is non-fatal"
    )]
    let _ = res.add_header("Allow", HeaderValue::from_static(ALLOW), true);
    #[expect(
        clippy::let_underscore_must_use,
        reason = "Header addition failure is non-fatal"
    )]
    let _ = res.add_header("DAV", HeaderValue::from_static(DAV_COMPLIANCE), true);
    res.status_code(salvo::http::StatusCode::OK);
}
