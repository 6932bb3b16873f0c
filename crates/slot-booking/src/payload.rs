//! Calendar wire types.
//!
//! Field names follow the Google Calendar v3 JSON representation (camelCase).
//! Optional response fields default when absent so that a sparse reply still
//! decodes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slot_engine::TimeInterval;

use crate::event::EventRequest;

/// Reminder sent by email one day before the event.
pub const EMAIL_REMINDER_MINUTES: u32 = 24 * 60;
/// Popup reminder thirty minutes before the event.
pub const POPUP_REMINDER_MINUTES: u32 = 30;
/// Conference solution requested for every event.
pub const CONFERENCE_SOLUTION: &str = "hangoutsMeet";
/// Attendee response status meaning the invitation has not been acted on.
pub const NEEDS_ACTION: &str = "needsAction";

/// Body of an event insert request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub attendees: Vec<AttendeeRef>,
    pub conference_data: ConferenceData,
    pub reminders: Reminders,
    pub guests_can_invite_others: bool,
    pub guests_can_modify: bool,
    pub guests_can_see_other_guests: bool,
}

impl EventPayload {
    /// Map an event request onto the backend payload.
    ///
    /// Adds a fresh conference-link request, the fixed reminder policy and
    /// the fixed guest permissions.
    pub fn from_request(req: &EventRequest) -> Self {
        Self {
            summary: req.title.clone(),
            description: req.description.clone(),
            start: EventDateTime::new(req.start, &req.timezone),
            end: EventDateTime::new(req.end, &req.timezone),
            attendees: req
                .attendee_emails
                .iter()
                .map(|email| AttendeeRef {
                    email: email.clone(),
                })
                .collect(),
            conference_data: ConferenceData::meet(),
            reminders: Reminders::fixed(),
            guests_can_invite_others: false,
            guests_can_modify: false,
            guests_can_see_other_guests: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: DateTime<Utc>,
    pub time_zone: String,
}

impl EventDateTime {
    pub fn new(date_time: DateTime<Utc>, time_zone: &str) -> Self {
        Self {
            date_time,
            time_zone: time_zone.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendeeRef {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceData {
    pub create_request: CreateConferenceRequest,
}

impl ConferenceData {
    /// A video-conference request with a unique request id.
    pub fn meet() -> Self {
        Self {
            create_request: CreateConferenceRequest {
                request_id: format!("event_{}", uuid::Uuid::new_v4().simple()),
                conference_solution_key: ConferenceSolutionKey {
                    kind: CONFERENCE_SOLUTION.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConferenceRequest {
    pub request_id: String,
    pub conference_solution_key: ConferenceSolutionKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConferenceSolutionKey {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

impl Reminders {
    pub fn fixed() -> Self {
        Self {
            use_default: false,
            overrides: vec![
                ReminderOverride {
                    method: ReminderMethod::Email,
                    minutes: EMAIL_REMINDER_MINUTES,
                },
                ReminderOverride {
                    method: ReminderMethod::Popup,
                    minutes: POPUP_REMINDER_MINUTES,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderOverride {
    pub method: ReminderMethod,
    pub minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    Email,
    Popup,
}

/// Who receives update notifications for an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendUpdates {
    #[default]
    All,
    ExternalOnly,
    None,
}

impl SendUpdates {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendUpdates::All => "all",
            SendUpdates::ExternalOnly => "externalOnly",
            SendUpdates::None => "none",
        }
    }
}

/// Query options for an event insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOptions {
    /// `1` asks the backend to honour `conferenceData.createRequest`.
    pub conference_data_version: u8,
    pub send_updates: SendUpdates,
    pub send_notifications: bool,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            conference_data_version: 1,
            send_updates: SendUpdates::All,
            send_notifications: true,
        }
    }
}

impl InsertOptions {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "conferenceDataVersion",
                self.conference_data_version.to_string(),
            ),
            ("sendUpdates", self.send_updates.as_str().to_string()),
            ("sendNotifications", self.send_notifications.to_string()),
        ]
    }
}

/// Event resource returned by a successful insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub html_link: Option<String>,
    #[serde(default)]
    pub hangout_link: Option<String>,
    #[serde(default)]
    pub attendees: Vec<AttendeeStatus>,
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,
}

impl EventResource {
    /// Emails of attendees whose invitation is still awaiting action.
    /// Attendees without an email are skipped.
    pub fn unconfirmed_attendees(&self) -> Vec<String> {
        self.attendees
            .iter()
            .filter(|a| a.response_status.as_deref() == Some(NEEDS_ACTION))
            .filter_map(|a| a.email.clone())
            .collect()
    }

    /// The timed interval the backend recorded, if it echoed one.
    pub fn recorded_interval(&self) -> Option<TimeInterval> {
        let start = self.start.as_ref()?.date_time?;
        let end = self.end.as_ref()?.date_time?;
        TimeInterval::new(start, end).ok()
    }
}

/// Start or end of a returned event. All-day events carry `date` instead of
/// `dateTime` and decode with `date_time` unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default)]
    pub date_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeStatus {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub response_status: Option<String>,
}

/// Body of a free/busy query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyRequest {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub items: Vec<FreeBusyItem>,
}

impl FreeBusyRequest {
    pub fn single(calendar_id: &str, time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> Self {
        Self {
            time_min,
            time_max,
            items: vec![FreeBusyItem {
                id: calendar_id.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeBusyItem {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FreeBusyResponse {
    #[serde(default)]
    pub calendars: HashMap<String, CalendarBusy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarBusy {
    #[serde(default)]
    pub busy: Vec<BusyPeriod>,
    #[serde(default)]
    pub errors: Vec<CalendarIssue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusyPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarIssue {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub reason: String,
}
