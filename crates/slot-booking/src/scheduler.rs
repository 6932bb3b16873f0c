//! The booking pipeline.
//!
//! [`Scheduler`] is the caller-facing API. One call runs to completion on the
//! calling thread; the only blocking points are the two backend calls and the
//! backoff sleeps between submission attempts.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use slot_engine::{
    check_slot, check_window, find_slots, search_range, AvailabilityRequest, BusySet,
    SlotSearchResult, TimeInterval,
};

use crate::backend::CalendarBackend;
use crate::config::Config;
use crate::error::{BackendError, BookingError, Result};
use crate::event::{EventRequest, EventResult};
use crate::payload::{EventPayload, EventResource, InsertOptions, NEEDS_ACTION};
use crate::retry::{submit_with_retry, RetryPolicy, SubmissionState};

type Sleeper = Box<dyn Fn(Duration) + Send + Sync>;

/// A meeting to place into the first free slot (or a caller-chosen one).
#[derive(Debug, Clone)]
pub struct MeetingRequest {
    pub title: String,
    pub description: Option<String>,
    pub attendee_emails: BTreeSet<String>,
    /// Timezone label attached to the created event.
    pub timezone: String,
    pub search: AvailabilityRequest,
    /// Book this slot instead of the engine's selection. It is checked
    /// against the search constraints and the busy set first.
    pub slot: Option<TimeInterval>,
}

/// Everything one `schedule` call produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub title: String,
    pub timezone: String,
    pub search: SlotSearchResult,
    /// The slot submitted for booking, if any.
    pub booked_slot: Option<TimeInterval>,
    /// `None` when no slot was available to book.
    pub booking: Option<EventResult>,
    /// Post-booking checks that did not hold. Informational only.
    pub issues: Vec<String>,
}

impl ScheduleOutcome {
    pub fn is_booked(&self) -> bool {
        self.booking.as_ref().is_some_and(EventResult::is_success)
    }

    /// Plain-text report of the outcome.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Meeting: {}", self.title);
        let _ = writeln!(out, "Search: {}", self.search.notes);
        if let Some(slot) = &self.booked_slot {
            let _ = writeln!(
                out,
                "Time: {} - {} ({})",
                slot.start.to_rfc3339(),
                slot.end.to_rfc3339(),
                self.timezone
            );
        }
        match &self.booking {
            Some(EventResult::Success {
                event_link,
                meet_link,
                event_id,
                ..
            }) => {
                let _ = writeln!(out, "Status: booked, notifications sent to attendees");
                let _ = writeln!(out, "Event ID: {}", event_id.as_deref().unwrap_or("-"));
                let _ = writeln!(out, "Event link: {}", event_link.as_deref().unwrap_or("-"));
                let _ = writeln!(out, "Meet link: {}", meet_link.as_deref().unwrap_or("-"));
            }
            Some(EventResult::Failure { error_message, .. }) => {
                let _ = writeln!(out, "Status: failed: {}", error_message);
            }
            None => {
                let _ = writeln!(out, "Status: not booked, no slot available");
            }
        }
        for issue in &self.issues {
            let _ = writeln!(out, "Issue: {}", issue);
        }
        out
    }
}

pub struct Scheduler<B> {
    backend: B,
    calendar_id: String,
    retry: RetryPolicy,
    options: InsertOptions,
    sleeper: Sleeper,
}

impl<B: CalendarBackend> Scheduler<B> {
    pub fn new(backend: B, calendar_id: impl Into<String>) -> Self {
        Self {
            backend,
            calendar_id: calendar_id.into(),
            retry: RetryPolicy::default(),
            options: InsertOptions::default(),
            sleeper: Box::new(std::thread::sleep),
        }
    }

    pub fn from_config(backend: B, config: &Config) -> Self {
        Self::new(backend, config.calendar_id.clone()).with_retry_policy(config.retry_policy())
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the backoff sleep (tests use a recorder).
    pub fn with_sleeper(mut self, sleeper: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// Query the backend for the busy intervals covering `req`'s days.
    ///
    /// # Errors
    /// `InvalidRequest` for a malformed request, `Unauthenticated` when
    /// credentials are missing or refused, `UpstreamUnavailable` for any other
    /// backend failure. Nothing is retried.
    pub fn get_busy(&self, req: &AvailabilityRequest) -> Result<BusySet> {
        let range = search_range(req)?;
        let busy = self
            .backend
            .free_busy(&self.calendar_id, range.start, range.end)
            .map_err(|err| match err {
                BackendError::Unauthorized(msg) => BookingError::Unauthenticated(msg),
                other => BookingError::UpstreamUnavailable(other.to_string()),
            })?;
        tracing::debug!(
            calendar = %self.calendar_id,
            busy = busy.len(),
            "free/busy query returned"
        );
        Ok(BusySet::new(busy))
    }

    /// Query busy intervals and search them.
    pub fn try_find_slots(&self, req: &AvailabilityRequest) -> Result<SlotSearchResult> {
        self.search(req).map(|(_, found)| found)
    }

    /// Like [`Scheduler::try_find_slots`], with failures folded into `notes`.
    pub fn find_slots(&self, req: &AvailabilityRequest) -> SlotSearchResult {
        self.try_find_slots(req).unwrap_or_else(|err| {
            tracing::error!("Failed to find available slots: {}", err);
            SlotSearchResult::empty(format!("Error finding slots: {}", err))
        })
    }

    /// Create the event, retrying transient submission failures.
    ///
    /// A request that fails validation returns `Failure` without any backend
    /// call. Unconfirmed attendees on success are logged and reported but do
    /// not change the status.
    pub fn book(&self, req: &EventRequest) -> EventResult {
        match self.submit(req) {
            Ok(resource) => EventResult::from_resource(&resource),
            Err(err) => err.into(),
        }
    }

    fn submit(&self, req: &EventRequest) -> Result<EventResource> {
        if let Err(err) = req.validate() {
            tracing::error!("Event creation rejected: {}", err);
            return Err(err);
        }

        let payload = EventPayload::from_request(req);
        let state = submit_with_retry(
            &self.retry,
            |_attempt| {
                self.backend
                    .insert_event(&self.calendar_id, &payload, &self.options)
            },
            |delay| (self.sleeper)(delay),
        );

        match state {
            SubmissionState::Succeeded { attempts, value } => {
                tracing::info!(
                    attempts,
                    event_id = value.id.as_deref().unwrap_or("-"),
                    "Event created; notifications sent to attendees"
                );
                for attendee in &value.attendees {
                    let email = attendee.email.as_deref().unwrap_or("<unknown>");
                    if attendee.response_status.as_deref() == Some(NEEDS_ACTION) {
                        tracing::warn!("Notification may not have reached {}", email);
                    } else {
                        tracing::info!("Notification confirmed for {}", email);
                    }
                }
                Ok(value)
            }
            SubmissionState::Rejected { attempts, error } => {
                tracing::error!("Event creation failed after {} attempt(s): {}", attempts, error);
                Err(match error {
                    BackendError::Unauthorized(msg) => BookingError::Unauthenticated(msg),
                    other => BookingError::SubmissionFailed(other.to_string()),
                })
            }
            SubmissionState::FailedExhausted { attempts, error } => {
                tracing::error!("Event creation failed after {} attempts: {}", attempts, error);
                Err(BookingError::SubmissionFailed(format!(
                    "{} (after {} attempts)",
                    error, attempts
                )))
            }
            // submit_with_retry only returns terminal states.
            other => Err(BookingError::SubmissionFailed(format!(
                "submission stopped after {} attempts without a result",
                other.attempts()
            ))),
        }
    }

    /// Alias of [`Scheduler::book`].
    pub fn create_event(&self, req: &EventRequest) -> EventResult {
        self.book(req)
    }

    /// Run the whole pipeline: busy lookup, slot search, slot choice,
    /// booking, and post-booking checks.
    pub fn schedule(&self, meeting: &MeetingRequest) -> ScheduleOutcome {
        let mut outcome = ScheduleOutcome {
            title: meeting.title.clone(),
            timezone: meeting.timezone.clone(),
            search: SlotSearchResult::empty(""),
            booked_slot: None,
            booking: None,
            issues: Vec::new(),
        };

        let (busy, search) = match self.search(&meeting.search) {
            Ok(found) => found,
            Err(err) => {
                tracing::error!("Failed to find available slots: {}", err);
                outcome.search = SlotSearchResult::empty(format!("Error finding slots: {}", err));
                outcome.booking = Some(err.into());
                return outcome;
            }
        };
        outcome.search = search;

        let slot = match meeting.slot {
            Some(chosen) => {
                if let Err(err) = check_slot(&busy, &meeting.search, &chosen) {
                    outcome.booking = Some(BookingError::from(err).into());
                    return outcome;
                }
                chosen
            }
            None => match outcome.search.selected {
                Some(selected) => selected,
                None => {
                    tracing::warn!("{}", outcome.search.notes);
                    return outcome;
                }
            },
        };

        let mut request = EventRequest::new(meeting.title.clone(), slot)
            .with_attendees(meeting.attendee_emails.iter().cloned())
            .with_timezone(meeting.timezone.clone());
        request.description = meeting.description.clone();

        let booking = match self.submit(&request) {
            Ok(resource) => {
                outcome.issues = verify(&resource, &slot, &meeting.search);
                EventResult::from_resource(&resource)
            }
            Err(err) => err.into(),
        };
        outcome.booked_slot = Some(slot);
        outcome.booking = Some(booking);
        outcome
    }

    fn search(&self, req: &AvailabilityRequest) -> Result<(BusySet, SlotSearchResult)> {
        req.validate()?;
        let busy = self.get_busy(req)?;
        let search = find_slots(&busy, req)?;
        Ok((busy, search))
    }
}

/// Checks on a created event that do not affect its status.
///
/// The interval the backend recorded (or the requested slot, when none was
/// echoed) must match the request and lie inside the search's daily window.
fn verify(
    resource: &EventResource,
    slot: &TimeInterval,
    search: &AvailabilityRequest,
) -> Vec<String> {
    let mut issues = Vec::new();

    let recorded = resource.recorded_interval().unwrap_or(*slot);
    if recorded != *slot {
        issues.push(format!(
            "backend recorded {} - {} instead of the requested slot",
            recorded.start.to_rfc3339(),
            recorded.end.to_rfc3339()
        ));
    }
    if let Err(err) = check_window(search, &recorded) {
        issues.push(format!("booked time fails the window check: {}", err));
    }
    if resource.hangout_link.is_none() {
        issues.push("no video-conference link was generated".to_string());
    }
    if resource.html_link.is_none() {
        issues.push("backend returned no event link".to_string());
    }
    for email in resource.unconfirmed_attendees() {
        issues.push(format!("invitation to {} not yet confirmed", email));
    }
    issues
}
