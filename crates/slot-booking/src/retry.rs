//! Retry state machine for event submission.
//!
//! ```text
//! Pending -> Submitting -> Succeeded
//!                       -> Retrying -> Submitting
//!                       -> FailedExhausted
//!                       -> Rejected
//! ```
//!
//! `Retrying` re-enters `Submitting` until `max_attempts` submissions have been
//! made. A non-retryable failure ends in `Rejected` regardless of budget.
//! After failed attempt `n` the driver waits `2^n` backoff units; it never
//! waits after the last attempt.

use std::time::Duration;

use crate::error::BackendError;

/// Total attempts allowed, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_unit,
        }
    }

    /// Delay after failed attempt `attempt` (counted from 1).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState<T> {
    Pending,
    Submitting { attempt: u32 },
    Retrying { attempt: u32, error: BackendError },
    Succeeded { attempts: u32, value: T },
    FailedExhausted { attempts: u32, error: BackendError },
    Rejected { attempts: u32, error: BackendError },
}

impl<T> SubmissionState<T> {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Succeeded { .. }
                | SubmissionState::FailedExhausted { .. }
                | SubmissionState::Rejected { .. }
        )
    }

    /// Number of submissions made so far.
    pub fn attempts(&self) -> u32 {
        match self {
            SubmissionState::Pending => 0,
            SubmissionState::Submitting { attempt } => attempt.saturating_sub(1),
            SubmissionState::Retrying { attempt, .. } => *attempt,
            SubmissionState::Succeeded { attempts, .. }
            | SubmissionState::FailedExhausted { attempts, .. }
            | SubmissionState::Rejected { attempts, .. } => *attempts,
        }
    }

    /// Move to the next submission: `Pending` and `Retrying` enter
    /// `Submitting`. Other states are returned unchanged.
    pub fn begin_attempt(self) -> Self {
        match self {
            SubmissionState::Pending => SubmissionState::Submitting { attempt: 1 },
            SubmissionState::Retrying { attempt, .. } => SubmissionState::Submitting {
                attempt: attempt + 1,
            },
            other => other,
        }
    }

    /// Apply the outcome of the submission in flight. Only meaningful from
    /// `Submitting`; other states are returned unchanged.
    pub fn record(self, outcome: Result<T, BackendError>, policy: &RetryPolicy) -> Self {
        let attempt = match self {
            SubmissionState::Submitting { attempt } => attempt,
            other => return other,
        };
        match outcome {
            Ok(value) => SubmissionState::Succeeded {
                attempts: attempt,
                value,
            },
            Err(error) if !error.is_retryable() => SubmissionState::Rejected {
                attempts: attempt,
                error,
            },
            Err(error) if attempt >= policy.max_attempts => SubmissionState::FailedExhausted {
                attempts: attempt,
                error,
            },
            Err(error) => SubmissionState::Retrying { attempt, error },
        }
    }
}

/// Drive `submit` through the state machine until a terminal state.
///
/// `submit` receives the attempt number (from 1). `sleep` is called with the
/// backoff delay between attempts.
pub fn submit_with_retry<T, F, S>(policy: &RetryPolicy, mut submit: F, mut sleep: S) -> SubmissionState<T>
where
    F: FnMut(u32) -> Result<T, BackendError>,
    S: FnMut(Duration),
{
    let mut state = SubmissionState::Pending;
    loop {
        state = match state {
            SubmissionState::Submitting { attempt } => {
                tracing::debug!(attempt, max = policy.max_attempts, "submitting");
                let outcome = submit(attempt);
                SubmissionState::Submitting { attempt }.record(outcome, policy)
            }
            SubmissionState::Retrying { attempt, error } => {
                let delay = policy.backoff(attempt);
                tracing::warn!("Attempt {} failed: {}; retrying in {:?}", attempt, error, delay);
                sleep(delay);
                SubmissionState::Retrying { attempt, error }.begin_attempt()
            }
            SubmissionState::Pending => SubmissionState::Pending.begin_attempt(),
            terminal => return terminal,
        };
    }
}
