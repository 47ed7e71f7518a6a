#![allow(clippy::expect_used, dead_code)]
//! Shared fixtures for the HTTP integration tests.
//!
//! Every test builds its own [`TestServer`] over a fresh `MemoryStorage`, so
//! tests share no state and run in parallel. Two accounts are seeded:
//! `alice` (calendars `personal` and `work`) and `bob` (`personal`).

use std::sync::{Arc, OnceLock};

use base64::Engine;
use salvo::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use salvo::http::{Method, ReqBody, StatusCode};
use salvo::prelude::*;
use salvo::test::{RequestBuilder, ResponseExt};

use kunai_test::component::auth::password::hash_password;
use kunai_test::component::config::{
    ConfigHandler, DavConfig, LoggingConfig, ServerConfig, Settings, UserConfig,
};
use kunai_test::component::storage::{MemoryStorage, Storage};
use kunai_test::component::storage_handler::StorageHandler;
use kunai_test::rfc::rfc::ical::parse::parse_icalendar;

pub const ALICE_PASSWORD: &str = "alice-secret";
pub const BOB_PASSWORD: &str = "bob-secret";

const ORIGIN: &str = "http://127.0.0.1:8698";

/// Argon2 is slow, so each password is hashed once per test binary.
fn cached_hash(password: &'static str) -> String {
    static HASHES: OnceLock<(String, String)> = OnceLock::new();
    let (alice, bob) = HASHES.get_or_init(|| {
        (
            hash_password(ALICE_PASSWORD).expect("hash alice"),
            hash_password(BOB_PASSWORD).expect("hash bob"),
        )
    });
    if password == ALICE_PASSWORD {
        alice.clone()
    } else {
        bob.clone()
    }
}

fn account(id: &str, password: &'static str, calendars: &[&str]) -> UserConfig {
    UserConfig {
        id: id.to_string(),
        display_name: format!("{id} (test)"),
        email: format!("{id}@example.com"),
        password_hash: cached_hash(password),
        calendars: calendars.iter().map(ToString::to_string).collect(),
    }
}

fn settings() -> Settings {
    Settings {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8698,
            serve_origin: None,
        },
        logging: LoggingConfig {
            level: "trace".to_string(),
        },
        dav: DavConfig::default(),
        users: vec![
            account("alice", ALICE_PASSWORD, &["personal", "work"]),
            account("bob", BOB_PASSWORD, &["personal"]),
        ],
    }
}

/// The full router, wired the way `main.rs` wires it, plus a handle on the
/// storage behind it.
pub struct TestServer {
    pub service: Service,
    pub storage: Arc<MemoryStorage>,
}

impl TestServer {
    /// ## Panics
    /// Panics if the routes cannot be built.
    #[must_use]
    pub fn new() -> Self {
        let settings = settings();
        let storage = Arc::new(MemoryStorage::from_settings(&settings));
        let routes = kunai_test::app::api::routes(&settings.dav).expect("routes");

        let router = Router::new()
            .hoop(StorageHandler {
                storage: storage.clone(),
            })
            .hoop(ConfigHandler::new(settings))
            .push(routes);

        Self {
            service: Service::new(router),
            storage,
        }
    }

    /// Stores an object without going through PUT.
    ///
    /// ## Panics
    /// Panics if `ical` does not parse or the calendar is missing.
    pub async fn seed(&self, user: &str, calendar: &str, object: &str, ical: &str) {
        let component = parse_icalendar(ical).expect("seed iCalendar");
        self.storage
            .update_object(user, calendar, object, component)
            .await
            .expect("seed object");
    }
}

/// `/dav/{owner}/cal/{calendar}/`, followed by `object` when given.
#[must_use]
pub fn cal_path(owner: &str, calendar: &str, object: Option<&str>) -> String {
    let mut path = format!("/dav/{owner}/cal/{calendar}/");
    if let Some(object) = object {
        path.push_str(object);
    }
    path
}

fn extension(name: &'static str) -> Method {
    Method::from_bytes(name.as_bytes()).expect("extension method")
}

/// A request under construction. Wraps salvo's [`RequestBuilder`] so every
/// method, DAV extensions included, goes through one path.
pub struct TestRequest {
    inner: RequestBuilder,
}

impl TestRequest {
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            inner: RequestBuilder::new(format!("{ORIGIN}{path}"), method),
        }
    }

    #[must_use]
    pub fn options(path: &str) -> Self {
        Self::new(Method::OPTIONS, path)
    }

    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn head(path: &str) -> Self {
        Self::new(Method::HEAD, path)
    }

    #[must_use]
    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn propfind(path: &str) -> Self {
        Self::new(extension("PROPFIND"), path)
    }

    #[must_use]
    pub fn report(path: &str) -> Self {
        Self::new(extension("REPORT"), path)
    }

    #[must_use]
    pub fn mkcalendar(path: &str) -> Self {
        Self::new(extension("MKCALENDAR"), path)
    }

    /// ## Panics
    /// Panics if `name` or `value` is not valid header text.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name = HeaderName::try_from(name).expect("header name");
        let value = HeaderValue::from_str(value).expect("header value");
        self.inner = self.inner.add_header(name, value, true);
        self
    }

    #[must_use]
    pub fn basic_auth(self, user: &str, password: &str) -> Self {
        let token = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{password}"));
        self.header(header::AUTHORIZATION.as_str(), &format!("Basic {token}"))
    }

    #[must_use]
    pub fn as_alice(self) -> Self {
        self.basic_auth("alice", ALICE_PASSWORD)
    }

    #[must_use]
    pub fn as_bob(self) -> Self {
        self.basic_auth("bob", BOB_PASSWORD)
    }

    #[must_use]
    pub fn depth(self, depth: &str) -> Self {
        self.header("Depth", depth)
    }

    #[must_use]
    pub fn if_match(self, etag: &str) -> Self {
        self.header(header::IF_MATCH.as_str(), etag)
    }

    #[must_use]
    pub fn if_none_match(self, etag: &str) -> Self {
        self.header(header::IF_NONE_MATCH.as_str(), etag)
    }

    #[must_use]
    pub fn xml(self, xml: &str) -> Self {
        self.typed_body("application/xml; charset=utf-8", xml)
    }

    #[must_use]
    pub fn ical(self, ical: &str) -> Self {
        self.typed_body("text/calendar; charset=utf-8", ical)
    }

    fn typed_body(self, content_type: &str, body: &str) -> Self {
        let mut this = self.header(header::CONTENT_TYPE.as_str(), content_type);
        this.inner = this
            .inner
            .body(ReqBody::Once(body.as_bytes().to_vec().into()));
        this
    }

    pub async fn send(self, server: &TestServer) -> TestResponse {
        let mut response = self.inner.send(&server.service).await;
        let status = response
            .status_code
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let headers = response.headers().clone();
        let bytes = response.take_bytes(None).await.unwrap_or_default();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

/// A completed response. Assertions consume and return `self` so they chain.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    #[must_use]
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status, expected,
            "unexpected status; body:\n{}",
            self.body
        );
        self
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn etag(&self) -> Option<String> {
        self.header("etag").map(String::from)
    }

    #[must_use]
    pub fn assert_header(self, name: &str, expected: &str) -> Self {
        assert_eq!(self.header(name), Some(expected), "header {name}");
        self
    }

    #[must_use]
    pub fn assert_header_contains(self, name: &str, needle: &str) -> Self {
        let value = self.header(name).unwrap_or_default();
        assert!(
            value.contains(needle),
            "header {name} = {value:?}, wanted {needle:?}"
        );
        self
    }

    #[must_use]
    pub fn assert_body_contains(self, needle: &str) -> Self {
        assert!(
            self.body.contains(needle),
            "{needle:?} not in body:\n{}",
            self.body
        );
        self
    }

    #[must_use]
    pub fn assert_body_lacks(self, needle: &str) -> Self {
        assert!(
            !self.body.contains(needle),
            "{needle:?} in body:\n{}",
            self.body
        );
        self
    }

    /// Number of `d:response` entries in a multistatus body.
    #[must_use]
    pub fn response_count(&self) -> usize {
        self.body.matches("<d:response>").count()
    }

    /// Every `d:href` text in document order.
    #[must_use]
    pub fn hrefs(&self) -> Vec<String> {
        self.body
            .split("<d:href>")
            .skip(1)
            .filter_map(|rest| rest.split_once("</d:href>"))
            .map(|(href, _)| href.to_string())
            .collect()
    }
}

/// A single-VEVENT calendar over `span`. `rrule` adds a recurrence rule.
#[must_use]
pub fn event_ics(uid: &str, summary: &str, span: (&str, &str), rrule: Option<&str>) -> String {
    let (start, end) = span;
    let rrule = rrule.map(|r| format!("RRULE:{r}\n")).unwrap_or_default();
    format!(
        "BEGIN:VCALENDAR\n\
         VERSION:2.0\n\
         PRODID:-//kunai//integration//EN\n\
         BEGIN:VEVENT\n\
         UID:{uid}\n\
         DTSTAMP:20260101T000000Z\n\
         DTSTART:{start}\n\
         DTEND:{end}\n\
         SUMMARY:{summary}\n\
         {rrule}\
         END:VEVENT\n\
         END:VCALENDAR\n"
    )
}

/// An event on 2026-01-26, 10:00-11:00 UTC.
#[must_use]
pub fn simple_event(uid: &str, summary: &str) -> String {
    event_ics(uid, summary, ("20260126T100000Z", "20260126T110000Z"), None)
}

const NAMESPACES: &str = r#"xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav" xmlns:cs="http://calendarserver.org/ns/""#;

/// PROPFIND body for `props`, written with the `d:`, `c:` and `cs:`
/// prefixes (`"d:getetag"`, `"c:calendar-data"`).
#[must_use]
pub fn propfind_body(props: &[&str]) -> String {
    let props: String = props.iter().map(|p| format!("<{p}/>")).collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><d:propfind {NAMESPACES}><d:prop>{props}</d:prop></d:propfind>"#
    )
}

#[must_use]
pub fn allprop_body() -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><d:propfind {NAMESPACES}><d:allprop/></d:propfind>"#
    )
}

#[must_use]
pub fn mkcalendar_body(displayname: &str, description: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<c:mkcalendar {NAMESPACES}>
  <d:set><d:prop>
    <d:displayname>{displayname}</d:displayname>
    <c:calendar-description>{description}</c:calendar-description>
  </d:prop></d:set>
</c:mkcalendar>"#
    )
}

/// calendar-query for VEVENTs overlapping `[start, end)`.
#[must_use]
pub fn event_query_body(start: &str, end: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<c:calendar-query {NAMESPACES}>
  <d:prop><d:getetag/><c:calendar-data/></d:prop>
  <c:filter>
    <c:comp-filter name="VCALENDAR">
      <c:comp-filter name="VEVENT">
        <c:time-range start="{start}" end="{end}"/>
      </c:comp-filter>
    </c:comp-filter>
  </c:filter>
</c:calendar-query>"#
    )
}

#[must_use]
pub fn multiget_body(hrefs: &[String]) -> String {
    let hrefs: String = hrefs
        .iter()
        .map(|h| format!("<d:href>{h}</d:href>"))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<c:calendar-multiget {NAMESPACES}>
  <d:prop><d:getetag/><c:calendar-data/></d:prop>
  {hrefs}
</c:calendar-multiget>"#
    )
}
