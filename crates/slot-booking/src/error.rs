//! Error types for slot-booking operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use slot_engine::EngineError;
use thiserror::Error;

/// Failures surfaced to callers of the booking API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Calendar backend unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Event submission failed: {0}")]
    SubmissionFailed(String),
}

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            BookingError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            BookingError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            BookingError::SubmissionFailed(_) => ErrorKind::SubmissionFailed,
        }
    }
}

impl From<EngineError> for BookingError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidRequest(msg) => BookingError::InvalidRequest(msg),
        }
    }
}

/// Serializable tag for a [`BookingError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    Unauthenticated,
    UpstreamUnavailable,
    SubmissionFailed,
}

/// Failures reported by a calendar backend or credential provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("credentials rejected: {0}")]
    Unauthorized(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("calendar error: {0}")]
    Calendar(String),
}

impl BackendError {
    /// Whether another submission attempt could succeed.
    ///
    /// Rejected credentials will be rejected again, and an undecodable reply
    /// may belong to an event that was in fact created.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, BackendError::Unauthorized(_) | BackendError::Decode(_))
    }
}

/// Failures loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, BookingError>;
