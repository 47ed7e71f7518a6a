//! Depth-limited expansion of a resource into its descendants.

use futures::future::BoxFuture;

use crate::dav::context::DavContext;
use crate::error::ServiceResult;
use crate::resource::{Resource, ResourceType};

/// ## Summary
/// Returns the descendants of `parent` up to `depth` levels, depth first.
///
/// Each child is followed immediately by its own descendants. A home set
/// expands to its calendars and a calendar to its objects; every other type
/// is terminal. The parent itself is not included.
///
/// ## Errors
/// Returns the first storage or path error, or `Cancelled` if the request
/// is cancelled between steps.
#[tracing::instrument(skip(ctx, parent), fields(parent = %parent))]
pub fn fetch_children<'a>(
    ctx: &'a DavContext,
    depth: u32,
    parent: &'a Resource,
) -> BoxFuture<'a, ServiceResult<Vec<Resource>>> {
    Box::pin(async move {
        if depth == 0 || parent.kind.is_terminal() {
            return Ok(Vec::new());
        }
        ctx.check_cancelled()?;

        let children = direct_children(ctx, parent).await?;

        let mut out = Vec::with_capacity(children.len());
        for child in children {
            let descendants = fetch_children(ctx, depth - 1, &child).await?;
            out.push(child);
            out.extend(descendants);
        }

        tracing::trace!(count = out.len(), "Expanded resource");
        Ok(out)
    })
}

async fn direct_children(ctx: &DavContext, parent: &Resource) -> ServiceResult<Vec<Resource>> {
    let (Some(user_id), kind) = (parent.user_id(), parent.kind) else {
        return Ok(Vec::new());
    };

    let children: Vec<Resource> = match (kind, parent.calendar_id()) {
        (ResourceType::HomeSet, _) => ctx
            .storage
            .get_user_calendars(user_id)
            .await?
            .into_iter()
            .map(|calendar| Resource::collection(user_id, calendar.id))
            .collect(),
        (ResourceType::Collection, Some(calendar_id)) => ctx
            .storage
            .get_object_paths_in_collection(user_id, calendar_id)
            .await?
            .into_iter()
            .map(|object_id| Resource::object(user_id, calendar_id, object_id))
            .collect(),
        _ => Vec::new(),
    };

    children
        .into_iter()
        .map(|child| -> ServiceResult<Resource> {
            let uri = ctx.codec.encode_path(&child)?;
            Ok(child.with_uri(uri))
        })
        .collect()
}
