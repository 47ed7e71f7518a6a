#![allow(unused_must_use)]
//! Tests for authentication and OPTIONS discovery.

use salvo::http::StatusCode;

use super::helpers::*;

/// ## Summary
/// OPTIONS is answered without credentials and advertises calendar-access.
#[test_log::test(tokio::test)]
async fn options_requires_no_credentials() {
    let server = TestServer::new();

    let response = TestRequest::options("/dav/alice/cal/").send(&server).await;

    response
        .assert_status(StatusCode::OK)
        .assert_header_contains("DAV", "calendar-access")
        .assert_header_contains("Allow", "PROPFIND")
        .assert_header_contains("Allow", "MKCALENDAR");
}

/// ## Summary
/// Requests without an Authorization header receive a Basic challenge.
#[test_log::test(tokio::test)]
async fn missing_credentials_are_challenged() {
    let server = TestServer::new();

    let response = TestRequest::propfind("/dav/alice/cal/")
        .depth("0")
        .send(&server)
        .await;

    response
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_header_contains("WWW-Authenticate", "Basic realm=");
}

/// ## Summary
/// Wrong passwords, unknown users and other schemes are all rejected.
#[test_log::test(tokio::test)]
async fn bad_credentials_are_rejected() {
    let server = TestServer::new();
    let uri = cal_path("alice", "personal", Some("a.ics"));

    let response = TestRequest::get(&uri)
        .basic_auth("alice", "not-the-password")
        .send(&server)
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = TestRequest::get(&uri)
        .basic_auth("mallory", ALICE_PASSWORD)
        .send(&server)
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = TestRequest::get(&uri)
        .header("Authorization", "Bearer token")
        .send(&server)
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

/// ## Summary
/// Authenticated users cannot reach another user's tree.
#[test_log::test(tokio::test)]
async fn foreign_tree_is_forbidden() {
    let server = TestServer::new();

    let response = TestRequest::propfind("/dav/bob/cal/")
        .as_alice()
        .depth("1")
        .send(&server)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = TestRequest::put(&cal_path("bob", "personal", Some("x.ics")))
        .as_alice()
        .ical(&simple_event("x", "Intrusion"))
        .send(&server)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = TestRequest::propfind("/dav/bob/cal/")
        .as_bob()
        .depth("0")
        .send(&server)
        .await;
    response.assert_status(StatusCode::MULTI_STATUS);
}
