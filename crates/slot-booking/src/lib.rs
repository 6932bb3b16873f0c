//! # slot-booking
//!
//! Books meetings into a calendar backend.
//!
//! The booking flow is a fixed pipeline: query the backend for busy intervals,
//! hand them to [`slot_engine`] for a free slot, submit an event for that slot
//! with attendee notifications, and report a structured outcome. Backend
//! failures never escape as panics; they are translated into the
//! [`BookingError`] taxonomy and surfaced as [`EventResult::Failure`] or as
//! search notes.
//!
//! ## Modules
//!
//! - [`scheduler`] — The caller-facing API: `get_busy`, `find_slots`, `book`, `schedule`
//! - [`retry`] — Submission retry state machine with exponential backoff
//! - [`event`] — Event requests, validation and results
//! - [`payload`] — Calendar wire types (event payload, insert options, free/busy)
//! - [`backend`] — Calendar backend and credential provider traits
//! - [`google`] — Google Calendar v3 backend over blocking HTTP
//! - [`config`] — TOML + environment configuration
//! - [`error`] — Error types

pub mod backend;
pub mod config;
pub mod error;
pub mod event;
pub mod google;
pub mod payload;
pub mod retry;
pub mod scheduler;

pub use backend::{CalendarBackend, CredentialProvider, MissingCredentials, StaticToken};
pub use config::Config;
pub use error::{BackendError, BookingError, ConfigError, ErrorKind};
pub use event::{EventRequest, EventResult};
pub use google::GoogleCalendar;
pub use retry::{submit_with_retry, RetryPolicy, SubmissionState};
pub use scheduler::{MeetingRequest, ScheduleOutcome, Scheduler};
