//! Free-slot search.
//!
//! A fixed-step linear scan: on every searched day a cursor walks the daily
//! window from its opening in `step` increments, and each `[cursor,
//! cursor + duration)` that fits the window and misses every busy interval
//! becomes a candidate. Gaps narrower than `step` at a busy boundary can be
//! missed; the output is deterministic and chronologically ordered.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::busy::BusySet;
use crate::error::{EngineError, Result};
use crate::interval::TimeInterval;
use crate::request::AvailabilityRequest;

/// Outcome of one slot search.
///
/// `selected` is `None` exactly when `candidates` is empty, and otherwise is
/// the first candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSearchResult {
    pub candidates: Vec<TimeInterval>,
    pub selected: Option<TimeInterval>,
    pub notes: String,
}

impl SlotSearchResult {
    /// A result with no candidates and an explanatory note.
    pub fn empty(notes: impl Into<String>) -> Self {
        Self {
            candidates: Vec::new(),
            selected: None,
            notes: notes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Scan the requested days for free slots of `req.duration`.
///
/// An empty result is a normal outcome, not an error.
///
/// # Errors
/// Returns `EngineError::InvalidRequest` if `req` fails [`AvailabilityRequest::validate`].
pub fn find_slots(busy: &BusySet, req: &AvailabilityRequest) -> Result<SlotSearchResult> {
    req.validate()?;

    let merged = busy.merged();
    let mut candidates = Vec::new();

    for day in req.days() {
        if req.exclude_weekdays.contains(&day.weekday()) {
            continue;
        }
        let Some((open, close)) = day_window(req, day) else {
            tracing::debug!(%day, "daily window does not exist in {}, skipping", req.timezone);
            continue;
        };

        // Unrepresentable instants end the day's scan.
        let mut cursor = open;
        while let Some(end) = cursor
            .checked_add_signed(req.duration)
            .filter(|end| *end <= close)
        {
            let too_early = req.not_before.is_some_and(|nb| cursor < nb);
            if !too_early && !merged.overlaps(cursor, end) {
                candidates.push(TimeInterval { start: cursor, end });
            }
            match cursor.checked_add_signed(req.step) {
                Some(next) => cursor = next,
                None => break,
            }
        }
    }

    let window = describe_window(req.window_start, req.window_end);
    let notes = if candidates.is_empty() {
        format!(
            "No available slots found between {} in the next {} days",
            window, req.range_days
        )
    } else {
        format!(
            "Found {} available slots between {} over {} days",
            candidates.len(),
            window,
            req.range_days
        )
    };

    tracing::debug!(
        busy = busy.len(),
        merged = merged.blocks().len(),
        candidates = candidates.len(),
        "slot search complete"
    );

    Ok(SlotSearchResult {
        selected: candidates.first().copied(),
        candidates,
        notes,
    })
}

/// Check a caller-chosen slot against the rules the scan applies.
///
/// The slot must pass [`check_window`], not start before `req.not_before`,
/// and miss every busy interval. The slot's length is not required to equal
/// `req.duration`.
///
/// # Errors
/// Returns `EngineError::InvalidRequest` describing the first rule the slot breaks.
pub fn check_slot(busy: &BusySet, req: &AvailabilityRequest, slot: &TimeInterval) -> Result<()> {
    check_window(req, slot)?;
    if req.not_before.is_some_and(|nb| slot.start < nb) {
        return Err(EngineError::InvalidRequest(
            "slot starts in the past".to_string(),
        ));
    }
    if busy.conflicts_with(slot) {
        return Err(EngineError::InvalidRequest(
            "slot overlaps a busy interval".to_string(),
        ));
    }

    Ok(())
}

/// Check that `slot` starts on a searched, non-excluded day and lies inside
/// that day's window. Busy intervals and `not_before` are not consulted.
///
/// # Errors
/// Returns `EngineError::InvalidRequest` describing the first rule the slot breaks.
pub fn check_window(req: &AvailabilityRequest, slot: &TimeInterval) -> Result<()> {
    req.validate()?;

    let day = slot.start.with_timezone(&req.timezone).date_naive();
    if !req.days().any(|d| d == day) {
        return Err(EngineError::InvalidRequest(format!(
            "slot day {} is outside the searched range",
            day
        )));
    }
    if req.exclude_weekdays.contains(&day.weekday()) {
        return Err(EngineError::InvalidRequest(format!(
            "slot day {} falls on excluded weekday {}",
            day,
            day.weekday()
        )));
    }

    let (open, close) = day_window(req, day).ok_or_else(|| {
        EngineError::InvalidRequest(format!("no daily window exists on {}", day))
    })?;
    let window = TimeInterval { start: open, end: close };
    if !window.contains(slot) {
        return Err(EngineError::InvalidRequest(format!(
            "slot is outside the daily window {}",
            describe_window(req.window_start, req.window_end)
        )));
    }

    Ok(())
}

/// Instant range covering every searched day, midnight to midnight in the
/// request timezone. This is the range a free/busy query must cover.
///
/// # Errors
/// Returns `EngineError::InvalidRequest` if `req` fails validation.
pub fn search_range(req: &AvailabilityRequest) -> Result<TimeInterval> {
    req.validate()?;
    let last = req
        .range_start
        .checked_add_days(chrono::Days::new(u64::from(req.range_days)))
        .ok_or_else(|| EngineError::InvalidRequest("date range overflows".to_string()))?;
    TimeInterval::new(
        local_midnight(req, req.range_start),
        local_midnight(req, last),
    )
}

/// The `[open, close)` window of `day` as UTC instants, or `None` when either
/// bound does not exist locally (DST gap).
fn day_window(req: &AvailabilityRequest, day: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let open = local_instant(req, day, req.window_start)?;
    let close = local_instant(req, day, req.window_end)?;
    Some((open, close))
}

fn local_instant(req: &AvailabilityRequest, day: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    req.timezone
        .from_local_datetime(&day.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn local_midnight(req: &AvailabilityRequest, day: NaiveDate) -> DateTime<Utc> {
    let naive = day.and_time(NaiveTime::default());
    local_instant(req, day, NaiveTime::default()).unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

fn describe_window(start: NaiveTime, end: NaiveTime) -> String {
    format!("{} and {}", start.format("%H:%M"), end.format("%H:%M"))
}
