mod dav;

use salvo::Router;

use crate::middleware::auth::AuthMiddleware;
use kunai_core::config::DavConfig;

pub use dav::util;

/// ## Summary
/// Constructs the router for everything below the configured DAV prefix.
///
/// ## Errors
/// Returns an error if any child route fails to initialize.
pub fn routes(dav: &DavConfig) -> anyhow::Result<Router> {
    let prefix = dav.normalized_prefix();
    let base = if prefix.is_empty() {
        Router::new()
    } else {
        Router::with_path(prefix.trim_start_matches('/'))
    };

    Ok(base
        .hoop(AuthMiddleware)
        .push(Router::with_path("{**rest}").push(dav::routes()?)))
}
