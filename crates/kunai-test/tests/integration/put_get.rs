#![allow(unused_must_use)]
//! Tests for PUT, GET, HEAD and DELETE on calendar objects.
//!
//! Verifies creation and replacement, conditional requests, and validation.

use salvo::http::StatusCode;

use super::helpers::*;

/// ## Summary
/// A full object lifecycle: create, replace, read, delete.
#[test_log::test(tokio::test)]
async fn object_lifecycle() {
    let server = TestServer::new();
    let uri = cal_path("alice", "personal", Some("standup.ics"));

    let created = TestRequest::put(&uri)
        .as_alice()
        .ical(&simple_event("standup", "Standup"))
        .send(&server)
        .await
        .assert_status(StatusCode::CREATED);
    let first_etag = created.etag().expect("ETag on create");

    let replaced = TestRequest::put(&uri)
        .as_alice()
        .if_match(&first_etag)
        .ical(&simple_event("standup", "Standup (moved)"))
        .send(&server)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let second_etag = replaced.etag().expect("ETag on replace");
    assert_ne!(first_etag, second_etag);

    let response = TestRequest::get(&uri).as_alice().send(&server).await;
    response
        .assert_status(StatusCode::OK)
        .assert_header("ETag", &second_etag)
        .assert_header_contains("Content-Type", "text/calendar")
        .assert_body_contains("SUMMARY:Standup (moved)");

    let response = TestRequest::delete(&uri).as_alice().send(&server).await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = TestRequest::get(&uri).as_alice().send(&server).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

/// ## Summary
/// `If-None-Match: *` protects an existing object from being overwritten.
#[test_log::test(tokio::test)]
async fn if_none_match_star_refuses_overwrite() {
    let server = TestServer::new();
    let uri = cal_path("alice", "personal", Some("once.ics"));
    let ical = simple_event("once", "Once");

    let response = TestRequest::put(&uri)
        .as_alice()
        .if_none_match("*")
        .ical(&ical)
        .send(&server)
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = TestRequest::put(&uri)
        .as_alice()
        .if_none_match("*")
        .ical(&ical)
        .send(&server)
        .await;
    response.assert_status(StatusCode::PRECONDITION_FAILED);
}

/// ## Summary
/// A stale `If-Match` ETag fails for both PUT and DELETE.
#[test_log::test(tokio::test)]
async fn stale_if_match_fails() {
    let server = TestServer::new();
    let uri = cal_path("alice", "personal", Some("meeting.ics"));

    let response = TestRequest::put(&uri)
        .as_alice()
        .ical(&simple_event("meeting", "Meeting"))
        .send(&server)
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = TestRequest::put(&uri)
        .as_alice()
        .if_match("\"not-the-etag\"")
        .ical(&simple_event("meeting", "Meeting 2"))
        .send(&server)
        .await;
    response.assert_status(StatusCode::PRECONDITION_FAILED);

    let response = TestRequest::delete(&uri)
        .as_alice()
        .if_match("\"not-the-etag\"")
        .send(&server)
        .await;
    response.assert_status(StatusCode::PRECONDITION_FAILED);
}

/// ## Summary
/// HEAD mirrors GET headers without a body; a matching `If-None-Match`
/// yields 304.
#[test_log::test(tokio::test)]
async fn head_and_conditional_get() {
    let server = TestServer::new();
    let uri = cal_path("alice", "work", Some("review.ics"));

    let created = TestRequest::put(&uri)
        .as_alice()
        .ical(&simple_event("review", "Review"))
        .send(&server)
        .await
        .assert_status(StatusCode::CREATED);
    let etag = created.etag().expect("ETag");

    let response = TestRequest::head(&uri)
        .as_alice()
        .send(&server)
        .await
        .assert_status(StatusCode::OK)
        .assert_header("ETag", &etag);
    assert!(response.body.is_empty());

    let response = TestRequest::get(&uri)
        .as_alice()
        .if_none_match(&etag)
        .send(&server)
        .await;
    response.assert_status(StatusCode::NOT_MODIFIED);
}

/// ## Summary
/// Bodies that are not iCalendar are rejected with 400.
#[test_log::test(tokio::test)]
async fn invalid_icalendar_is_rejected() {
    let server = TestServer::new();
    let uri = cal_path("alice", "personal", Some("bad.ics"));

    let response = TestRequest::put(&uri)
        .as_alice()
        .ical("this is not a calendar")
        .send(&server)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let mixed_uids = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//kunai//Test//EN\r\n\
        BEGIN:VEVENT\r\nUID:one\r\nDTSTAMP:20260125T120000Z\r\nDTSTART:20260126T100000Z\r\nEND:VEVENT\r\n\
        BEGIN:VEVENT\r\nUID:two\r\nDTSTAMP:20260125T120000Z\r\nDTSTART:20260127T100000Z\r\nEND:VEVENT\r\n\
        END:VCALENDAR\r\n";
    let response = TestRequest::put(&uri)
        .as_alice()
        .ical(mixed_uids)
        .send(&server)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

/// ## Summary
/// Object methods on collections are not allowed.
#[test_log::test(tokio::test)]
async fn object_methods_on_collections_are_not_allowed() {
    let server = TestServer::new();

    let response = TestRequest::get(&cal_path("alice", "personal", None))
        .as_alice()
        .send(&server)
        .await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);

    let response = TestRequest::delete(&cal_path("alice", "personal", None))
        .as_alice()
        .send(&server)
        .await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

/// ## Summary
/// PUT into a calendar that does not exist is 404.
#[test_log::test(tokio::test)]
async fn put_into_missing_calendar_is_not_found() {
    let server = TestServer::new();

    let response = TestRequest::put(&cal_path("alice", "nowhere", Some("a.ics")))
        .as_alice()
        .ical(&simple_event("a", "A"))
        .send(&server)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}
