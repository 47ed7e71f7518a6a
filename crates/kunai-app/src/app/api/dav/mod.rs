// CalDAV request handling: method routing, body extraction and the shared
// multistatus/error response writers.

use salvo::{Router, http::Method, routing::MethodFilter};

pub mod method;
pub mod util;

/// ## Summary
/// Routes every supported method on the current path.
///
/// ## Errors
/// Returns an error if an extension method name is invalid.
pub fn routes() -> anyhow::Result<Router> {
    Ok(Router::new()
        .options(method::options::options)
        .get(method::get_head::get)
        .head(method::get_head::head)
        .put(method::put::put)
        .delete(method::delete::delete)
        .push(
            Router::new()
                .filter(MethodFilter(Method::from_bytes(b"PROPFIND")?))
                .goal(method::propfind::propfind),
        )
        .push(
            Router::new()
                .filter(MethodFilter(Method::from_bytes(b"REPORT")?))
                .goal(method::report::report),
        )
        .push(
            Router::new()
                .filter(MethodFilter(Method::from_bytes(b"MKCALENDAR")?))
                .goal(method::mkcalendar::mkcalendar),
        ))
}
