//! Property resolution for one resource.
//!
//! Every requested name is resolved on its own, so a failing property only
//! ever affects its own entry in the response.

mod env;
mod table;

pub use env::ResolveEnv;
pub use table::{Resolver, ResolverTable, supported_names, table_for};

use kunai_rfc::rfc::dav::build::{build_propname_response, build_response};
use kunai_rfc::rfc::dav::core::{
    PropertyError, PropertyMap, PropertyName, PropfindRequest, QName,
};
use kunai_rfc::rfc::xml::Element;

/// ## Summary
/// Resolves the properties a request selects.
///
/// `allprop` covers every name the resource answers except `calendar-data`,
/// plus any `include` names. Names outside the catalog, or without a resolver
/// for this resource type, come back as not found.
#[tracing::instrument(skip_all, fields(href = %env.href))]
pub async fn resolve_properties(env: &ResolveEnv<'_>, request: &PropfindRequest) -> PropertyMap {
    let requested: Vec<QName> = match request {
        PropfindRequest::Prop(names) => names.clone(),
        PropfindRequest::AllProp { include } => supported_names(env.resource.kind)
            .into_iter()
            .filter(|name| *name != PropertyName::CalendarData)
            .map(PropertyName::qname)
            .chain(include.iter().cloned())
            .collect(),
        PropfindRequest::PropName => Vec::new(),
    };

    let table = table_for(env.resource.kind);
    let mut map = PropertyMap::new();

    for qname in requested {
        let Some(name) = PropertyName::from_local_name(qname.local_name()) else {
            map.insert(qname, Err(PropertyError::NotFound));
            continue;
        };
        let outcome = match table.and_then(|t| t.get(&name)) {
            Some(resolver) => resolver(env).await,
            None => Err(PropertyError::NotFound),
        };
        if let Err(e) = &outcome {
            tracing::trace!(property = %name, error = %e, "Property unresolved");
        }
        map.insert_cataloged(name, outcome);
    }

    map
}

/// ## Summary
/// Resolves one resource and renders it as a single-response multistatus
/// document, ready to be merged.
pub async fn render_response(env: &ResolveEnv<'_>, request: &PropfindRequest) -> Element {
    if matches!(request, PropfindRequest::PropName) {
        let names: Vec<QName> = supported_names(env.resource.kind)
            .into_iter()
            .map(PropertyName::qname)
            .collect();
        return build_propname_response(&env.href, &names);
    }

    let map = resolve_properties(env, request).await;
    build_response(&env.href, &map)
}
