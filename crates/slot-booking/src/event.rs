//! Event requests and booking results.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use slot_engine::TimeInterval;

use crate::error::{BookingError, ErrorKind, Result};
use crate::payload::EventResource;

/// A meeting to create in the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub attendee_emails: BTreeSet<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl EventRequest {
    pub fn new(title: impl Into<String>, slot: TimeInterval) -> Self {
        Self {
            title: title.into(),
            description: None,
            start: slot.start,
            end: slot.end,
            attendee_emails: BTreeSet::new(),
            timezone: default_timezone(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attendees<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attendee_emails = emails.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Check the request before anything is sent.
    ///
    /// # Errors
    /// Returns `BookingError::InvalidRequest` naming the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(BookingError::InvalidRequest(format!(
                "start {} must be before end {}",
                self.start.to_rfc3339(),
                self.end.to_rfc3339()
            )));
        }
        if self.title.trim().is_empty() {
            return Err(BookingError::InvalidRequest(
                "title must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .attendee_emails
            .iter()
            .find(|email| !looks_like_email(email))
        {
            return Err(BookingError::InvalidRequest(format!(
                "invalid attendee email: '{}'",
                bad
            )));
        }
        if self.timezone.parse::<Tz>().is_err() {
            return Err(BookingError::InvalidRequest(format!(
                "unknown timezone: '{}'",
                self.timezone
            )));
        }
        Ok(())
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !email.contains(' '),
        None => false,
    }
}

/// Outcome of a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventResult {
    Success {
        event_link: Option<String>,
        meet_link: Option<String>,
        event_id: Option<String>,
        /// Attendees whose invitation is still awaiting action. Informational only.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        unconfirmed_attendees: Vec<String>,
    },
    Failure {
        kind: ErrorKind,
        error_message: String,
    },
}

impl EventResult {
    pub fn from_resource(resource: &EventResource) -> Self {
        EventResult::Success {
            event_link: resource.html_link.clone(),
            meet_link: resource.hangout_link.clone(),
            event_id: resource.id.clone(),
            unconfirmed_attendees: resource.unconfirmed_attendees(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EventResult::Success { .. })
    }
}

impl From<BookingError> for EventResult {
    fn from(err: BookingError) -> Self {
        EventResult::Failure {
            kind: err.kind(),
            error_message: err.to_string(),
        }
    }
}
