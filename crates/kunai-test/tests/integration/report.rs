#![allow(unused_must_use)]
//! Tests for REPORT (calendar-query and calendar-multiget).

use salvo::http::StatusCode;

use super::helpers::*;

async fn seeded() -> TestServer {
    let server = TestServer::new();
    server
        .seed(
            "alice",
            "personal",
            "jan.ics",
            &event_ics("jan", "January", ("20260115T090000Z", "20260115T100000Z"), None),
        )
        .await;
    server
        .seed(
            "alice",
            "personal",
            "mar.ics",
            &event_ics("mar", "March", ("20260310T090000Z", "20260310T100000Z"), None),
        )
        .await;
    server
        .seed(
            "alice",
            "work",
            "weekly.ics",
            &event_ics(
                "weekly",
                "Weekly sync",
                ("20260126T100000Z", "20260126T110000Z"),
                Some("FREQ=WEEKLY;COUNT=10"),
            ),
        )
        .await;
    server
}

/// ## Summary
/// A time-range query returns only overlapping events of the collection.
#[test_log::test(tokio::test)]
async fn calendar_query_time_range_on_collection() {
    let server = seeded().await;

    let response = TestRequest::report(&cal_path("alice", "personal", None))
        .as_alice()
        .xml(&event_query_body(
            "20260101T000000Z",
            "20260201T000000Z",
        ))
        .send(&server)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("UID:jan")
        .assert_body_lacks("UID:mar");

    assert_eq!(response.response_count(), 1);
}

/// ## Summary
/// Recurring events match windows that only a later instance overlaps.
#[test_log::test(tokio::test)]
async fn calendar_query_matches_recurrence_instances() {
    let server = seeded().await;

    // Fifth weekly instance: 2026-02-23.
    let response = TestRequest::report(&cal_path("alice", "work", None))
        .as_alice()
        .xml(&event_query_body(
            "20260223T000000Z",
            "20260224T000000Z",
        ))
        .send(&server)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("UID:weekly");
    assert_eq!(response.response_count(), 1);

    // After COUNT runs out.
    let response = TestRequest::report(&cal_path("alice", "work", None))
        .as_alice()
        .xml(&event_query_body(
            "20260601T000000Z",
            "20260701T000000Z",
        ))
        .send(&server)
        .await
        .assert_status(StatusCode::MULTI_STATUS);
    assert_eq!(response.response_count(), 0);
}

/// ## Summary
/// A query on the home set covers every calendar.
#[test_log::test(tokio::test)]
async fn calendar_query_on_home_set_spans_calendars() {
    let server = seeded().await;

    let response = TestRequest::report("/dav/alice/cal/")
        .as_alice()
        .xml(&event_query_body(
            "20260101T000000Z",
            "20260201T000000Z",
        ))
        .send(&server)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("UID:jan")
        .assert_body_contains("UID:weekly");

    assert_eq!(response.response_count(), 2);
}

/// ## Summary
/// Multiget answers each href in order, with 404 and 403 entries for
/// missing and foreign objects.
#[test_log::test(tokio::test)]
async fn calendar_multiget_mixed_hrefs() {
    let server = seeded().await;

    let hrefs = vec![
        cal_path("alice", "personal", Some("mar.ics")),
        cal_path("alice", "personal", Some("missing.ics")),
        cal_path("bob", "personal", Some("secret.ics")),
    ];
    let response = TestRequest::report(&cal_path("alice", "personal", None))
        .as_alice()
        .xml(&multiget_body(&hrefs))
        .send(&server)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("UID:mar")
        .assert_body_contains("HTTP/1.1 404 Not Found")
        .assert_body_contains("HTTP/1.1 403 Forbidden");

    assert_eq!(response.response_count(), 3);
    assert_eq!(response.hrefs(), hrefs);
}

/// ## Summary
/// Unsupported report types are rejected.
#[test_log::test(tokio::test)]
async fn unsupported_report_is_bad_request() {
    let server = seeded().await;

    let body = r#"<?xml version="1.0" encoding="utf-8"?>
<D:sync-collection xmlns:D="DAV:">
  <D:sync-token/>
  <D:prop><D:getetag/></D:prop>
</D:sync-collection>"#;
    let response = TestRequest::report(&cal_path("alice", "personal", None))
        .as_alice()
        .xml(body)
        .send(&server)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
