#![allow(unused_must_use)]
//! Tests for MKCALENDAR.

use salvo::http::StatusCode;

use super::helpers::*;

/// ## Summary
/// MKCALENDAR creates a calendar that PROPFIND then reports.
#[test_log::test(tokio::test)]
async fn mkcalendar_creates_calendar() {
    let server = TestServer::new();
    let uri = cal_path("alice", "chores", None);

    let response = TestRequest::mkcalendar(&uri)
        .as_alice()
        .xml(&mkcalendar_body("Chores", "Things to do"))
        .send(&server)
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = TestRequest::propfind(&uri)
        .as_alice()
        .depth("0")
        .xml(&propfind_body(&["d:displayname", "c:calendar-description"]))
        .send(&server)
        .await;
    response
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("Chores")
        .assert_body_contains("Things to do");
}

/// ## Summary
/// MKCALENDAR without a body uses defaults; a repeat is not allowed.
#[test_log::test(tokio::test)]
async fn mkcalendar_twice_is_not_allowed() {
    let server = TestServer::new();
    let uri = cal_path("alice", "scratch", None);

    let response = TestRequest::mkcalendar(&uri).as_alice().send(&server).await;
    response.assert_status(StatusCode::CREATED);

    let response = TestRequest::mkcalendar(&uri).as_alice().send(&server).await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

/// ## Summary
/// MKCALENDAR is refused outside calendar paths and in other users' trees.
#[test_log::test(tokio::test)]
async fn mkcalendar_rejects_bad_targets() {
    let server = TestServer::new();

    let response = TestRequest::mkcalendar("/dav/alice/cal/")
        .as_alice()
        .send(&server)
        .await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);

    let response = TestRequest::mkcalendar(&cal_path("bob", "sneaky", None))
        .as_alice()
        .send(&server)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}
