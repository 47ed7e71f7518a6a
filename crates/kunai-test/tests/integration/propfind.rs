#![allow(unused_must_use)]
//! Tests for PROPFIND.
//!
//! Verifies depth handling, per-type properties and multistatus shape.

use salvo::http::StatusCode;

use super::helpers::*;

async fn seeded() -> TestServer {
    let server = TestServer::new();
    server
        .seed(
            "alice",
            "personal",
            "event1.ics",
            &simple_event("event1", "First"),
        )
        .await;
    server
        .seed(
            "alice",
            "personal",
            "event2.ics",
            &simple_event("event2", "Second"),
        )
        .await;
    server
}

/// ## Summary
/// Depth infinity on the home set walks every calendar and object.
#[test_log::test(tokio::test)]
async fn propfind_infinity_walks_home_set() {
    let server = seeded().await;

    let response = TestRequest::propfind("/dav/alice/cal/")
        .as_alice()
        .depth("infinity")
        .xml(&propfind_body(&["d:getetag", "d:displayname"]))
        .send(&server)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_header_contains("Content-Type", "application/xml");

    assert_eq!(response.response_count(), 5);
    let hrefs = response.hrefs();
    for expected in [
        "/dav/alice/cal/",
        "/dav/alice/cal/personal/",
        "/dav/alice/cal/personal/event1.ics",
        "/dav/alice/cal/personal/event2.ics",
        "/dav/alice/cal/work/",
    ] {
        assert!(hrefs.iter().any(|h| h == expected), "missing {expected} in {hrefs:?}");
    }
}

/// ## Summary
/// A missing Depth header is treated as infinity.
#[test_log::test(tokio::test)]
async fn propfind_without_depth_defaults_to_infinity() {
    let server = seeded().await;

    let response = TestRequest::propfind("/dav/alice/cal/personal/")
        .as_alice()
        .send(&server)
        .await
        .assert_status(StatusCode::MULTI_STATUS);

    assert_eq!(response.response_count(), 3);
}

/// ## Summary
/// Depth 0 answers only the target; Depth 1 adds direct children.
#[test_log::test(tokio::test)]
async fn propfind_depth_zero_and_one() {
    let server = seeded().await;

    let response = TestRequest::propfind("/dav/alice/cal/")
        .as_alice()
        .depth("0")
        .xml(&allprop_body())
        .send(&server)
        .await
        .assert_status(StatusCode::MULTI_STATUS);
    assert_eq!(response.response_count(), 1);

    let response = TestRequest::propfind("/dav/alice/cal/")
        .as_alice()
        .depth("1")
        .xml(&allprop_body())
        .send(&server)
        .await
        .assert_status(StatusCode::MULTI_STATUS);
    assert_eq!(response.response_count(), 3);
}

/// ## Summary
/// Calendar collections report CalDAV properties; unknown names are 404
/// inside the multistatus.
#[test_log::test(tokio::test)]
async fn propfind_calendar_properties() {
    let server = seeded().await;

    let body = propfind_body(&[
        "d:resourcetype",
        "c:supported-calendar-component-set",
        "cs:getctag",
        r#"x:shoe-size xmlns:x="urn:example""#,
    ]);
    let response = TestRequest::propfind("/dav/alice/cal/personal/")
        .as_alice()
        .depth("0")
        .xml(&body)
        .send(&server)
        .await;

    response
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("calendar")
        .assert_body_contains("VEVENT")
        .assert_body_contains("getctag")
        .assert_body_contains("HTTP/1.1 200 OK")
        .assert_body_contains("HTTP/1.1 404 Not Found");
}

/// ## Summary
/// The principal advertises its calendar home.
#[test_log::test(tokio::test)]
async fn propfind_principal_home_set() {
    let server = TestServer::new();

    let body = propfind_body(&["c:calendar-home-set"]);
    let response = TestRequest::propfind("/dav/alice/")
        .as_alice()
        .depth("0")
        .xml(&body)
        .send(&server)
        .await;

    response
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("/dav/alice/cal/");
}

/// ## Summary
/// Missing resources and malformed bodies map to HTTP errors, not multistatus.
#[test_log::test(tokio::test)]
async fn propfind_errors() {
    let server = TestServer::new();

    let response = TestRequest::propfind("/dav/alice/cal/nowhere/")
        .as_alice()
        .depth("0")
        .send(&server)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = TestRequest::propfind("/dav/alice/cal/")
        .as_alice()
        .depth("0")
        .xml("<d:bogus xmlns:d=\"DAV:\"/>")
        .send(&server)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
