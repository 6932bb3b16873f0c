//! Tests for event validation, payload construction and result encoding.

use chrono::{TimeZone, Utc};
use serde_json::json;
use slot_booking::payload::{EventPayload, EventResource, InsertOptions};
use slot_booking::{BookingError, ErrorKind, EventRequest, EventResult};
use slot_engine::TimeInterval;

fn slot() -> TimeInterval {
    TimeInterval::new(
        Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 16, 11, 0, 0).unwrap(),
    )
    .unwrap()
}

fn request() -> EventRequest {
    EventRequest::new("Project Kickoff", slot())
        .with_description("Initial meeting to discuss project goals")
        .with_attendees(["bob@example.com", "ada@example.com"])
        .with_timezone("Europe/London")
}

// ── Validation ──────────────────────────────────────────────────────────────

#[test]
fn valid_request_passes() {
    assert!(request().validate().is_ok());
    assert!(EventRequest::new("Solo", slot()).validate().is_ok());
}

#[test]
fn invalid_requests_fail_validation() {
    let mut same_instant = request();
    same_instant.end = same_instant.start;

    let mut blank_title = request();
    blank_title.title = "   ".to_string();

    let bad_email = request().with_attendees(["not-an-email"]);
    let bad_zone = request().with_timezone("Mars/Olympus_Mons");

    for req in [same_instant, blank_title, bad_email, bad_zone] {
        assert!(
            matches!(req.validate(), Err(BookingError::InvalidRequest(_))),
            "expected InvalidRequest for {:?}",
            req
        );
    }
}

// ── Payload ─────────────────────────────────────────────────────────────────

#[test]
fn payload_matches_calendar_wire_format() {
    let payload = EventPayload::from_request(&request());
    let value = serde_json::to_value(&payload).unwrap();

    assert_eq!(value["summary"], "Project Kickoff");
    assert_eq!(value["description"], "Initial meeting to discuss project goals");
    assert_eq!(
        value["start"],
        json!({"dateTime": "2026-03-16T10:00:00Z", "timeZone": "Europe/London"})
    );
    assert_eq!(
        value["end"],
        json!({"dateTime": "2026-03-16T11:00:00Z", "timeZone": "Europe/London"})
    );
    // Attendee set is ordered.
    assert_eq!(
        value["attendees"],
        json!([{"email": "ada@example.com"}, {"email": "bob@example.com"}])
    );
    assert_eq!(
        value["conferenceData"]["createRequest"]["conferenceSolutionKey"],
        json!({"type": "hangoutsMeet"})
    );
    assert_eq!(
        value["reminders"],
        json!({
            "useDefault": false,
            "overrides": [
                {"method": "email", "minutes": 1440},
                {"method": "popup", "minutes": 30}
            ]
        })
    );
    assert_eq!(value["guestsCanInviteOthers"], false);
    assert_eq!(value["guestsCanModify"], false);
    assert_eq!(value["guestsCanSeeOtherGuests"], true);
}

#[test]
fn payload_omits_missing_description() {
    let payload = EventPayload::from_request(&EventRequest::new("No notes", slot()));
    let value = serde_json::to_value(&payload).unwrap();

    assert!(value.get("description").is_none());
    assert_eq!(value["attendees"], json!([]));
}

#[test]
fn conference_request_ids_are_unique() {
    let a = EventPayload::from_request(&request());
    let b = EventPayload::from_request(&request());
    assert_ne!(
        a.conference_data.create_request.request_id,
        b.conference_data.create_request.request_id
    );
}

#[test]
fn insert_options_request_notifications_for_all() {
    let pairs = InsertOptions::default().query_pairs();
    assert!(pairs.contains(&("conferenceDataVersion", "1".to_string())));
    assert!(pairs.contains(&("sendUpdates", "all".to_string())));
    assert!(pairs.contains(&("sendNotifications", "true".to_string())));
}

// ── Results ─────────────────────────────────────────────────────────────────

#[test]
fn sparse_resource_yields_success_with_missing_links() {
    let resource: EventResource = serde_json::from_value(json!({"id": "abc"})).unwrap();

    let result = EventResult::from_resource(&resource);

    assert_eq!(
        result,
        EventResult::Success {
            event_link: None,
            meet_link: None,
            event_id: Some("abc".to_string()),
            unconfirmed_attendees: vec![],
        }
    );
}

#[test]
fn only_needs_action_counts_as_unconfirmed() {
    let resource: EventResource = serde_json::from_value(json!({
        "id": "abc",
        "attendees": [
            {"email": "a@example.com", "responseStatus": "needsAction"},
            {"email": "b@example.com", "responseStatus": "tentative"},
            {"email": "c@example.com"}
        ]
    }))
    .unwrap();

    assert_eq!(resource.unconfirmed_attendees(), vec!["a@example.com"]);
}

#[test]
fn unconfirmed_attendee_without_email_is_skipped() {
    let resource: EventResource = serde_json::from_value(json!({
        "attendees": [
            {"responseStatus": "needsAction"},
            {"email": "a@example.com", "responseStatus": "needsAction"}
        ]
    }))
    .unwrap();

    assert_eq!(resource.unconfirmed_attendees(), vec!["a@example.com"]);
}

#[test]
fn recorded_interval_reads_timed_events_only() {
    let timed: EventResource = serde_json::from_value(json!({
        "start": {"dateTime": "2026-03-16T11:00:00+01:00", "timeZone": "Europe/Paris"},
        "end": {"dateTime": "2026-03-16T12:00:00+01:00", "timeZone": "Europe/Paris"}
    }))
    .unwrap();
    let all_day: EventResource = serde_json::from_value(json!({
        "start": {"date": "2026-03-16"},
        "end": {"date": "2026-03-17"}
    }))
    .unwrap();

    let recorded = timed.recorded_interval().unwrap();
    assert_eq!(recorded.start, Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap());
    assert_eq!(recorded.end, Utc.with_ymd_and_hms(2026, 3, 16, 11, 0, 0).unwrap());
    assert_eq!(all_day.recorded_interval(), None);
}

#[test]
fn results_serialize_with_status_tag() {
    let success = EventResult::Success {
        event_link: Some("https://calendar.example/e".to_string()),
        meet_link: None,
        event_id: Some("e".to_string()),
        unconfirmed_attendees: vec![],
    };
    assert_eq!(
        serde_json::to_value(&success).unwrap(),
        json!({
            "status": "success",
            "event_link": "https://calendar.example/e",
            "meet_link": null,
            "event_id": "e"
        })
    );

    let failure: EventResult = BookingError::SubmissionFailed("HTTP 500".into()).into();
    assert_eq!(
        serde_json::to_value(&failure).unwrap(),
        json!({
            "status": "failure",
            "kind": "submission_failed",
            "error_message": "Event submission failed: HTTP 500"
        })
    );
    assert!(matches!(
        failure,
        EventResult::Failure {
            kind: ErrorKind::SubmissionFailed,
            ..
        }
    ));
}
