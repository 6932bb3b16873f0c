//! Tests for intervals and busy-set merging.

use chrono::{DateTime, Duration, TimeZone, Utc};
use slot_engine::{BusySet, EngineError, TimeInterval};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, hour, min, 0).unwrap()
}

fn iv(start: (u32, u32), end: (u32, u32)) -> TimeInterval {
    TimeInterval::new(at(start.0, start.1), at(end.0, end.1)).unwrap()
}

// ── TimeInterval ────────────────────────────────────────────────────────────

#[test]
fn new_rejects_empty_and_inverted_intervals() {
    assert!(matches!(
        TimeInterval::new(at(10, 0), at(10, 0)),
        Err(EngineError::InvalidRequest(_))
    ));
    assert!(matches!(
        TimeInterval::new(at(11, 0), at(10, 0)),
        Err(EngineError::InvalidRequest(_))
    ));
}

#[test]
fn adjacent_intervals_do_not_overlap() {
    let a = iv((10, 0), (11, 0));
    let b = iv((11, 0), (12, 0));
    assert!(!a.overlaps(&b));
    assert!(!b.overlaps(&a));
}

#[test]
fn partial_and_nested_overlaps_detected() {
    let a = iv((10, 0), (11, 0));
    assert!(a.overlaps(&iv((10, 30), (11, 30))));
    assert!(a.overlaps(&iv((9, 0), (10, 15))));
    assert!(a.overlaps(&iv((10, 15), (10, 45))));
    assert!(a.overlaps(&iv((9, 0), (12, 0))));
}

#[test]
fn contains_and_duration() {
    let window = iv((10, 0), (17, 0));
    assert!(window.contains(&iv((10, 0), (11, 0))));
    assert!(window.contains(&iv((16, 0), (17, 0))));
    assert!(!window.contains(&iv((16, 30), (17, 30))));
    assert_eq!(window.duration(), Duration::hours(7));
}

// ── BusySet ─────────────────────────────────────────────────────────────────

#[test]
fn merged_sorts_and_coalesces() {
    // Unordered input: 14-15, 10-11:30, 11-12, 12-12:30 (adjacent to 11-12)
    let busy = BusySet::new(vec![
        iv((14, 0), (15, 0)),
        iv((10, 0), (11, 30)),
        iv((11, 0), (12, 0)),
        iv((12, 0), (12, 30)),
    ]);

    let merged = busy.merged();

    assert_eq!(
        merged.blocks(),
        &[iv((10, 0), (12, 30)), iv((14, 0), (15, 0))]
    );
}

#[test]
fn merged_overlap_lookup_matches_linear_check() {
    let busy = BusySet::new(vec![
        iv((9, 0), (9, 30)),
        iv((10, 0), (11, 0)),
        iv((13, 0), (13, 15)),
    ]);
    let merged = busy.merged();

    for (start, end) in [
        ((8, 0), (9, 0)),
        ((9, 15), (10, 15)),
        ((11, 0), (12, 0)),
        ((12, 0), (13, 0)),
        ((12, 45), (13, 1)),
        ((13, 15), (14, 0)),
    ] {
        let slot = iv(start, end);
        let expected = busy.intervals().iter().any(|b| b.overlaps(&slot));
        assert_eq!(
            merged.overlaps(slot.start, slot.end),
            expected,
            "mismatch for {:?}",
            slot
        );
        assert_eq!(busy.conflicts_with(&slot), expected, "mismatch for {:?}", slot);
    }
}

#[test]
fn busy_set_deserializes_from_json_array() {
    let json = r#"[
        {"start": "2026-03-16T10:00:00Z", "end": "2026-03-16T11:00:00Z"},
        {"start": "2026-03-16T13:00:00Z", "end": "2026-03-16T14:00:00Z"}
    ]"#;

    let busy: BusySet = serde_json::from_str(json).unwrap();

    assert_eq!(busy.len(), 2);
    assert_eq!(busy.intervals()[0], iv((10, 0), (11, 0)));
}
