//! Slot search requests.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::{EngineError, Result};

/// Default number of calendar days searched.
pub const DEFAULT_RANGE_DAYS: u32 = 7;
/// Default scan granularity in minutes.
pub const DEFAULT_STEP_MINUTES: i64 = 15;

/// Constraints for one slot search.
///
/// Days run from `range_start` for `range_days` days. On each day that is not
/// excluded, the window `[window_start, window_end)` in `timezone` is scanned
/// in increments of `step` for free intervals of length `duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityRequest {
    pub duration: Duration,
    pub range_start: NaiveDate,
    pub range_days: u32,
    pub window_start: NaiveTime,
    pub window_end: NaiveTime,
    pub step: Duration,
    pub exclude_weekdays: HashSet<Weekday>,
    /// Zone in which the daily window is interpreted.
    pub timezone: Tz,
    /// Candidates starting before this instant are dropped.
    pub not_before: Option<DateTime<Utc>>,
}

impl AvailabilityRequest {
    /// A request with the default constraints: seven days, 10:00-17:00 UTC,
    /// 15-minute step, weekends excluded.
    pub fn new(duration: Duration, range_start: NaiveDate) -> Self {
        Self {
            duration,
            range_start,
            range_days: DEFAULT_RANGE_DAYS,
            window_start: default_window_start(),
            window_end: default_window_end(),
            step: Duration::minutes(DEFAULT_STEP_MINUTES),
            exclude_weekdays: default_excluded_weekdays(),
            timezone: Tz::UTC,
            not_before: None,
        }
    }

    pub fn with_range_days(mut self, range_days: u32) -> Self {
        self.range_days = range_days;
        self
    }

    pub fn with_window(mut self, window_start: NaiveTime, window_end: NaiveTime) -> Self {
        self.window_start = window_start;
        self.window_end = window_end;
        self
    }

    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    pub fn with_excluded_weekdays(mut self, weekdays: impl IntoIterator<Item = Weekday>) -> Self {
        self.exclude_weekdays = weekdays.into_iter().collect();
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_not_before(mut self, not_before: DateTime<Utc>) -> Self {
        self.not_before = Some(not_before);
        self
    }

    /// Length of the daily window.
    pub fn window_length(&self) -> Duration {
        self.window_end - self.window_start
    }

    /// Check the request invariants.
    ///
    /// A duration longer than the window is accepted; such a request simply
    /// has no candidates.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidRequest` naming the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.duration <= Duration::zero() {
            return Err(EngineError::InvalidRequest(
                "duration must be positive".to_string(),
            ));
        }
        if self.step <= Duration::zero() {
            return Err(EngineError::InvalidRequest(
                "step must be positive".to_string(),
            ));
        }
        if self.range_days == 0 {
            return Err(EngineError::InvalidRequest(
                "range_days must be at least 1".to_string(),
            ));
        }
        if self.window_start >= self.window_end {
            return Err(EngineError::InvalidRequest(format!(
                "window start {} is not before window end {}",
                self.window_start.format("%H:%M"),
                self.window_end.format("%H:%M")
            )));
        }
        Ok(())
    }

    /// Calendar days covered by the request, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.range_start.iter_days().take(self.range_days as usize)
    }
}

pub fn default_window_start() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default()
}

pub fn default_window_end() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default()
}

pub fn default_excluded_weekdays() -> HashSet<Weekday> {
    HashSet::from([Weekday::Sat, Weekday::Sun])
}
