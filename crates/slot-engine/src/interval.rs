//! Half-open time intervals.
//!
//! Every interval is `[start, end)` with `start < end`. Two intervals overlap
//! when neither ends at or before the other begins; intervals that merely touch
//! (one ends exactly when the other starts) do NOT overlap.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A `[start, end)` span between two instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    /// Build an interval, rejecting empty or inverted spans.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidRequest` if `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(EngineError::InvalidRequest(format!(
                "interval start {} is not before end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// `[a,b)` and `[c,d)` overlap iff `!(b <= c || a >= d)`.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }

    /// True when `other` lies entirely within this interval.
    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
