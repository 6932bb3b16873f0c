//! Busy-interval sets.
//!
//! A [`BusySet`] is the unordered answer of a free/busy query. It is never
//! stored; it lives for the duration of one search. For scanning, the set is
//! collapsed into a sorted, non-overlapping union so that each candidate can be
//! tested with a binary search instead of a pass over every interval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::TimeInterval;

/// Unordered collection of busy intervals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusySet {
    intervals: Vec<TimeInterval>,
}

impl BusySet {
    pub fn new(intervals: Vec<TimeInterval>) -> Self {
        Self { intervals }
    }

    pub fn intervals(&self) -> &[TimeInterval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Merge overlapping or adjacent intervals.
    ///
    /// Returns a list sorted by start with no two entries overlapping or touching.
    pub fn merged(&self) -> MergedBusy {
        let mut sorted = self.intervals.clone();
        // Sort by start time (then by end time for stability).
        sorted.sort_by_key(|iv| (iv.start, iv.end));

        let mut merged: Vec<TimeInterval> = Vec::with_capacity(sorted.len());
        for iv in sorted {
            if let Some(last) = merged.last_mut() {
                if iv.start <= last.end {
                    last.end = last.end.max(iv.end);
                    continue;
                }
            }
            merged.push(iv);
        }

        MergedBusy { blocks: merged }
    }

    /// True if `slot` overlaps any interval in the set.
    pub fn conflicts_with(&self, slot: &TimeInterval) -> bool {
        self.merged().overlaps(slot.start, slot.end)
    }
}

impl From<Vec<TimeInterval>> for BusySet {
    fn from(intervals: Vec<TimeInterval>) -> Self {
        Self::new(intervals)
    }
}

impl FromIterator<TimeInterval> for BusySet {
    fn from_iter<I: IntoIterator<Item = TimeInterval>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Sorted, disjoint union of a [`BusySet`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergedBusy {
    blocks: Vec<TimeInterval>,
}

impl MergedBusy {
    pub fn blocks(&self) -> &[TimeInterval] {
        &self.blocks
    }

    /// True if `[start, end)` overlaps any merged block.
    ///
    /// Blocks are disjoint and sorted, so their ends are sorted too: the only
    /// block that can overlap is the first one ending after `start`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let idx = self.blocks.partition_point(|b| b.end <= start);
        self.blocks.get(idx).is_some_and(|b| b.start < end)
    }
}
