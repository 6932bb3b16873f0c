//! Google Calendar v3 backend over blocking HTTP.
//!
//! Endpoints:
//! - `POST {base}/freeBusy` for busy intervals
//! - `POST {base}/calendars/{calendarId}/events` for event creation
//!
//! Every call fetches a bearer token from the credential provider first.
//! HTTP 401 and 403 are reported as [`BackendError::Unauthorized`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use slot_engine::TimeInterval;

use crate::backend::{CalendarBackend, CredentialProvider};
use crate::config::Config;
use crate::error::BackendError;
use crate::payload::{EventPayload, EventResource, FreeBusyRequest, FreeBusyResponse, InsertOptions};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

pub struct GoogleCalendar {
    client: Client,
    base_url: String,
    credentials: Box<dyn CredentialProvider>,
}

impl GoogleCalendar {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Box<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            credentials,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        Self::new(
            config.api_base_url.clone(),
            config.credentials(),
            config.timeout(),
        )
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| BackendError::Transport(format!("invalid base URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::Transport(format!("base URL '{}' cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let token = self.credentials.access_token()?;
        let response = request
            .bearer_auth(token)
            .send()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::Unauthorized(format!("HTTP {}: {}", status.as_u16(), body)));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

impl CalendarBackend for GoogleCalendar {
    fn free_busy(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<TimeInterval>, BackendError> {
        let url = self.endpoint(&["freeBusy"])?;
        let body = FreeBusyRequest::single(calendar_id, time_min, time_max);
        let response: FreeBusyResponse = self.send(self.client.post(url).json(&body))?;

        let Some(calendar) = response.calendars.get(calendar_id) else {
            return Ok(Vec::new());
        };
        if let Some(issue) = calendar.errors.first() {
            return Err(BackendError::Calendar(format!(
                "{}: {} ({})",
                calendar_id, issue.reason, issue.domain
            )));
        }

        calendar
            .busy
            .iter()
            .map(|period| {
                TimeInterval::new(period.start, period.end)
                    .map_err(|e| BackendError::Decode(e.to_string()))
            })
            .collect()
    }

    fn insert_event(
        &self,
        calendar_id: &str,
        payload: &EventPayload,
        options: &InsertOptions,
    ) -> Result<EventResource, BackendError> {
        let url = self.endpoint(&["calendars", calendar_id, "events"])?;
        let request = self
            .client
            .post(url)
            .query(&options.query_pairs())
            .json(payload);
        self.send(request)
    }
}
