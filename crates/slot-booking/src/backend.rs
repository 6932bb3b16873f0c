//! Calendar backend and credential provider seams.

use chrono::{DateTime, Utc};
use slot_engine::TimeInterval;

use crate::error::BackendError;
use crate::payload::{EventPayload, EventResource, InsertOptions};

/// A calendar service that can answer free/busy queries and accept new events.
pub trait CalendarBackend {
    /// Busy intervals of `calendar_id` within `[time_min, time_max)`.
    fn free_busy(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<TimeInterval>, BackendError>;

    /// Create an event and return the stored resource.
    fn insert_event(
        &self,
        calendar_id: &str,
        payload: &EventPayload,
        options: &InsertOptions,
    ) -> Result<EventResource, BackendError>;
}

impl<B: CalendarBackend + ?Sized> CalendarBackend for &B {
    fn free_busy(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<TimeInterval>, BackendError> {
        (**self).free_busy(calendar_id, time_min, time_max)
    }

    fn insert_event(
        &self,
        calendar_id: &str,
        payload: &EventPayload,
        options: &InsertOptions,
    ) -> Result<EventResource, BackendError> {
        (**self).insert_event(calendar_id, payload, options)
    }
}

/// Supplies a bearer token for backend calls.
///
/// Called once per backend request, so a provider may refresh tokens.
pub trait CredentialProvider: Send + Sync {
    fn access_token(&self) -> Result<String, BackendError>;
}

/// A fixed, pre-authorized access token.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

impl CredentialProvider for StaticToken {
    fn access_token(&self) -> Result<String, BackendError> {
        Ok(self.0.clone())
    }
}

/// Provider used when no token is configured; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingCredentials;

impl CredentialProvider for MissingCredentials {
    fn access_token(&self) -> Result<String, BackendError> {
        Err(BackendError::Unauthorized(
            "no access token configured (set SLOT_ACCESS_TOKEN or access_token)".to_string(),
        ))
    }
}
