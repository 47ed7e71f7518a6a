//! PROPFIND: resolve properties across a resource subtree.

use kunai_rfc::rfc::dav::build::merge_multistatus;
use kunai_rfc::rfc::dav::core::{Depth, PropfindRequest};
use kunai_rfc::rfc::dav::parse::parse_propfind;
use kunai_rfc::rfc::xml::Element;

use crate::dav::context::DavContext;
use crate::dav::resolve::{ResolveEnv, render_response};
use crate::dav::walker::fetch_children;
use crate::error::ServiceResult;
use crate::resource::Resource;

/// ## Summary
/// Answers a PROPFIND request body for `path`.
///
/// ## Errors
/// Returns an error for a malformed body or path, a resource the principal
/// may not access, a missing resource, a failed walk, or cancellation.
#[tracing::instrument(skip(ctx, body), fields(body_len = body.len()))]
pub async fn propfind(
    ctx: &DavContext,
    path: &str,
    depth: Depth,
    body: &str,
) -> ServiceResult<Element> {
    let request = parse_propfind(body)?;
    let resource = ctx.codec.parse_path(path)?;
    ctx.ensure_owner(&resource)?;
    ctx.ensure_exists(&resource).await?;

    propfind_resource(ctx, &resource, depth, &request).await
}

/// ## Summary
/// Runs an already parsed PROPFIND against an existing resource.
///
/// The target comes first, followed by its descendants in walk order.
///
/// ## Errors
/// Returns an error if the walk fails, a resource cannot be encoded, or the
/// request is cancelled.
pub async fn propfind_resource(
    ctx: &DavContext,
    resource: &Resource,
    depth: Depth,
    request: &PropfindRequest,
) -> ServiceResult<Element> {
    let mut resources = vec![resource.clone()];
    resources.extend(fetch_children(ctx, depth.levels(), resource).await?);
    tracing::debug!(count = resources.len(), %depth, "Resolving resources");

    let mut documents = Vec::with_capacity(resources.len());
    for resource in &resources {
        ctx.check_cancelled()?;
        let href = ctx.codec.href(resource)?;
        let env = ResolveEnv::new(ctx, resource, href);
        let response = render_response(&env, request).await;
        documents.push(Some(response));
    }

    Ok(merge_multistatus(documents)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use kunai_core::config::{DavConfig, UserConfig};
    use kunai_rfc::rfc::dav::core::{MkcalendarRequest, CompFilter};
    use kunai_rfc::rfc::ical::core::Component;
    use kunai_rfc::rfc::ical::parse::parse_icalendar;

    use super::*;
    use crate::error::ServiceError;
    use crate::storage::{
        CalendarRecord, MemoryStorage, ObjectRecord, Storage, StorageError, StorageResult,
        UserRecord,
    };

    fn alice() -> UserConfig {
        UserConfig {
            id: "alice".to_string(),
            display_name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            calendars: vec!["personal".to_string()],
        }
    }

    fn event(uid: &str) -> Component {
        parse_icalendar(&format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:{uid}\r\n\
             DTSTART:20240110T100000Z\r\nSUMMARY:{uid}\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n"
        ))
        .expect("parse")
    }

    async fn seeded_storage() -> MemoryStorage {
        let storage = MemoryStorage::with_users(&[alice()]);
        for uid in ["event1", "event2"] {
            storage
                .update_object("alice", "personal", &format!("{uid}.ics"), event(uid))
                .await
                .expect("store");
        }
        storage
    }

    fn context(storage: impl Storage + 'static) -> DavContext {
        DavContext::new(Arc::new(storage), DavConfig::default()).with_principal("alice")
    }

    fn hrefs(doc: &Element) -> Vec<String> {
        doc.children_named("response")
            .filter_map(|r| r.child("href"))
            .map(Element::text)
            .collect()
    }

    /// Status text of the propstat group holding `local_name` in `response`.
    fn status_of(response: &Element, local_name: &str) -> Option<String> {
        response
            .children_named("propstat")
            .find(|ps| ps.child("prop").and_then(|p| p.child(local_name)).is_some())
            .and_then(|ps| ps.child("status"))
            .map(Element::text)
    }

    #[test_log::test(tokio::test)]
    async fn infinite_depth_on_home_set_lists_four_responses() {
        let ctx = context(seeded_storage().await);
        let body = r#"<d:propfind xmlns:d="DAV:"><d:prop><d:getetag/><d:displayname/></d:prop></d:propfind>"#;

        let doc = propfind(&ctx, "/dav/alice/cal/", Depth::Infinity, body)
            .await
            .expect("propfind");

        assert_eq!(doc.name, "d:multistatus");
        assert_eq!(
            hrefs(&doc),
            vec![
                "/dav/alice/cal/",
                "/dav/alice/cal/personal/",
                "/dav/alice/cal/personal/event1.ics",
                "/dav/alice/cal/personal/event2.ics",
            ]
        );
    }

    #[test_log::test(tokio::test)]
    async fn depth_zero_answers_target_only() {
        let ctx = context(seeded_storage().await);
        let doc = propfind(&ctx, "/dav/alice/cal/personal/", Depth::Zero, "")
            .await
            .expect("propfind");

        let responses: Vec<&Element> = doc.children_named("response").collect();
        assert_eq!(responses.len(), 1);
        let response = responses[0];
        assert_eq!(status_of(response, "displayname").as_deref(), Some("HTTP/1.1 200 OK"));
        assert_eq!(status_of(response, "getctag").as_deref(), Some("HTTP/1.1 200 OK"));
        assert!(status_of(response, "calendar-data").is_none());
    }

    #[test_log::test(tokio::test)]
    async fn unknown_and_unsupported_names_are_not_found() {
        let ctx = context(seeded_storage().await);
        let body = r#"<d:propfind xmlns:d="DAV:" xmlns:x="urn:example"><d:prop>
            <d:resourcetype/><x:shoe-size/><d:getcontentlength/>
        </d:prop></d:propfind>"#;

        let doc = propfind(&ctx, "/dav/alice/", Depth::Zero, body)
            .await
            .expect("propfind");
        let response = doc.child("response").expect("response");
        assert_eq!(status_of(response, "resourcetype").as_deref(), Some("HTTP/1.1 200 OK"));
        assert_eq!(
            status_of(response, "shoe-size").as_deref(),
            Some("HTTP/1.1 404 Not Found")
        );
        assert_eq!(
            status_of(response, "getcontentlength").as_deref(),
            Some("HTTP/1.1 404 Not Found")
        );
    }

    #[test_log::test(tokio::test)]
    async fn propname_lists_names_without_values() {
        let ctx = context(seeded_storage().await);
        let body = r#"<d:propfind xmlns:d="DAV:"><d:propname/></d:propfind>"#;

        let doc = propfind(&ctx, "/dav/alice/cal/personal/event1.ics", Depth::Zero, body)
            .await
            .expect("propfind");
        let prop = doc
            .child("response")
            .and_then(|r| r.child("propstat"))
            .and_then(|ps| ps.child("prop"))
            .expect("prop");
        let data = prop.child("calendar-data").expect("calendar-data listed");
        assert!(data.children.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn object_properties() {
        let ctx = context(seeded_storage().await);
        let body = r#"<d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav"><d:prop>
            <d:resourcetype/><d:getcontenttype/><c:calendar-data/><d:getetag/>
        </d:prop></d:propfind>"#;

        let doc = propfind(&ctx, "/dav/alice/cal/personal/event1.ics", Depth::Zero, body)
            .await
            .expect("propfind");
        let prop = doc
            .child("response")
            .and_then(|r| r.child("propstat"))
            .and_then(|ps| ps.child("prop"))
            .expect("prop");

        assert!(prop.find("vevent").is_some());
        assert_eq!(
            prop.child("getcontenttype").map(Element::text).as_deref(),
            Some("text/calendar; charset=utf-8; component=vevent")
        );
        assert!(prop
            .child("calendar-data")
            .map(Element::text)
            .is_some_and(|data| data.contains("UID:event1")));
        assert!(prop
            .child("getetag")
            .map(Element::text)
            .is_some_and(|etag| etag.starts_with('"')));
    }

    #[test_log::test(tokio::test)]
    async fn other_users_tree_is_forbidden() {
        let ctx = context(seeded_storage().await).with_principal("mallory");
        let err = propfind(&ctx, "/dav/alice/cal/", Depth::Zero, "")
            .await
            .expect_err("forbidden");
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[test_log::test(tokio::test)]
    async fn missing_resource_is_not_found() {
        let ctx = context(seeded_storage().await);
        let err = propfind(&ctx, "/dav/alice/cal/nope/", Depth::Zero, "")
            .await
            .expect_err("missing");
        assert!(matches!(
            err,
            ServiceError::StorageError(StorageError::NotFound(_))
        ));

        let err = propfind(&ctx, "/dav/alice/calendars/x/", Depth::Zero, "")
            .await
            .expect_err("bad path");
        assert!(matches!(err, ServiceError::PathError(_)));
    }

    /// Storage whose calendar lookups fail with a backend error.
    struct BrokenCalendars(MemoryStorage);

    #[async_trait]
    impl Storage for BrokenCalendars {
        async fn get_user(&self, user_id: &str) -> StorageResult<UserRecord> {
            self.0.get_user(user_id).await
        }

        async fn get_calendar(&self, _user_id: &str, _calendar_id: &str) -> StorageResult<CalendarRecord> {
            Err(StorageError::Backend("connection reset".to_string()))
        }

        async fn get_object(
            &self,
            user_id: &str,
            calendar_id: &str,
            object_id: &str,
        ) -> StorageResult<ObjectRecord> {
            self.0.get_object(user_id, calendar_id, object_id).await
        }

        async fn get_user_calendars(&self, user_id: &str) -> StorageResult<Vec<CalendarRecord>> {
            self.0.get_user_calendars(user_id).await
        }

        async fn get_object_paths_in_collection(
            &self,
            user_id: &str,
            calendar_id: &str,
        ) -> StorageResult<Vec<String>> {
            self.0.get_object_paths_in_collection(user_id, calendar_id).await
        }

        async fn get_objects_by_filter(
            &self,
            user_id: &str,
            calendar_id: &str,
            filter: Option<&CompFilter>,
        ) -> StorageResult<Vec<ObjectRecord>> {
            self.0.get_objects_by_filter(user_id, calendar_id, filter).await
        }

        async fn create_calendar(
            &self,
            user_id: &str,
            calendar_id: &str,
            request: &MkcalendarRequest,
        ) -> StorageResult<CalendarRecord> {
            self.0.create_calendar(user_id, calendar_id, request).await
        }

        async fn update_object(
            &self,
            user_id: &str,
            calendar_id: &str,
            object_id: &str,
            component: Component,
        ) -> StorageResult<ObjectRecord> {
            self.0.update_object(user_id, calendar_id, object_id, component).await
        }

        async fn delete_object(
            &self,
            user_id: &str,
            calendar_id: &str,
            object_id: &str,
        ) -> StorageResult<()> {
            self.0.delete_object(user_id, calendar_id, object_id).await
        }

        async fn auth_user(&self, username: &str, password: &str) -> StorageResult<String> {
            self.0.auth_user(username, password).await
        }
    }

    #[test_log::test(tokio::test)]
    async fn storage_failure_is_isolated_to_its_property() {
        let ctx = context(BrokenCalendars(seeded_storage().await));
        let body = r#"<d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav"><d:prop>
            <d:owner/><d:displayname/><c:max-instances/>
        </d:prop></d:propfind>"#;

        let resource = Resource::collection("alice", "personal");
        let request = parse_propfind(body).expect("parse");
        let doc = propfind_resource(&ctx, &resource, Depth::Zero, &request)
            .await
            .expect("propfind");

        let response = doc.child("response").expect("response");
        assert_eq!(status_of(response, "owner").as_deref(), Some("HTTP/1.1 200 OK"));
        assert_eq!(status_of(response, "max-instances").as_deref(), Some("HTTP/1.1 200 OK"));
        assert_eq!(
            status_of(response, "displayname").as_deref(),
            Some("HTTP/1.1 500 Internal Server Error")
        );
    }

    #[test_log::test(tokio::test)]
    async fn cancelled_request_stops_before_resolving() {
        let ctx = context(seeded_storage().await);
        ctx.cancel.cancel();
        let err = propfind(&ctx, "/dav/alice/", Depth::Zero, "")
            .await
            .expect_err("cancelled");
        assert!(matches!(err, ServiceError::Cancelled));
    }
}
