//! Property-based tests for the slot scan using proptest.
//!
//! These check invariants that must hold for any busy set and any well-formed
//! request, not just the fixed scenarios in `search_tests.rs`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use proptest::prelude::*;
use slot_engine::{find_slots, AvailabilityRequest, BusySet, TimeInterval};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap()
}

/// Busy intervals scattered over the first ten days after 2026-03-16.
fn arb_busy() -> impl Strategy<Value = BusySet> {
    prop::collection::vec((0i64..(10 * 24 * 60), 5i64..=240), 0..25).prop_map(|raw| {
        raw.into_iter()
            .map(|(offset, len)| {
                let start = base() + Duration::minutes(offset);
                TimeInterval::new(start, start + Duration::minutes(len)).unwrap()
            })
            .collect()
    })
}

fn arb_step() -> impl Strategy<Value = i64> {
    prop_oneof![Just(5i64), Just(10), Just(15), Just(30), Just(60)]
}

/// Window bounds as minutes after midnight, start strictly before end.
fn arb_window() -> impl Strategy<Value = (u32, u32)> {
    (0u32..(23 * 60)).prop_flat_map(|start| ((start + 1)..=(24 * 60 - 1)).prop_map(move |end| (start, end)))
}

fn arb_request() -> impl Strategy<Value = AvailabilityRequest> {
    (0u32..14, 1u32..=10, arb_window(), 5i64..=180, arb_step()).prop_map(
        |(offset, days, (ws, we), duration, step)| {
            let start = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap() + Duration::days(i64::from(offset));
            AvailabilityRequest::new(Duration::minutes(duration), start)
                .with_range_days(days)
                .with_window(minutes_to_time(ws), minutes_to_time(we))
                .with_step(Duration::minutes(step))
        },
    )
}

fn minutes_to_time(minutes: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn candidates_never_overlap_busy(busy in arb_busy(), req in arb_request()) {
        let result = find_slots(&busy, &req).unwrap();
        for slot in &result.candidates {
            for interval in busy.intervals() {
                prop_assert!(!slot.overlaps(interval), "{:?} overlaps {:?}", slot, interval);
            }
        }
    }

    #[test]
    fn candidates_stay_inside_window_and_range(busy in arb_busy(), req in arb_request()) {
        let result = find_slots(&busy, &req).unwrap();
        let last_day = req.range_start + Duration::days(i64::from(req.range_days) - 1);
        for slot in &result.candidates {
            let day = slot.start.date_naive();
            prop_assert!(day >= req.range_start && day <= last_day);
            prop_assert_eq!(slot.end.date_naive(), day);
            prop_assert!(slot.start.time() >= req.window_start);
            prop_assert!(slot.end.time() <= req.window_end);
            prop_assert!(!req.exclude_weekdays.contains(&day.weekday()));
            prop_assert!(day.weekday() != Weekday::Sat && day.weekday() != Weekday::Sun);
            prop_assert_eq!(slot.duration(), req.duration);
        }
    }

    #[test]
    fn candidates_strictly_increasing(busy in arb_busy(), req in arb_request()) {
        let result = find_slots(&busy, &req).unwrap();
        prop_assert!(result.candidates.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn selected_is_first_candidate(busy in arb_busy(), req in arb_request()) {
        let result = find_slots(&busy, &req).unwrap();
        prop_assert_eq!(result.selected, result.candidates.first().copied());
    }

    #[test]
    fn empty_calendar_fills_every_weekday(req in arb_request()) {
        let result = find_slots(&BusySet::default(), &req).unwrap();
        let fits = req.duration <= req.window_length();
        for day in req.days() {
            if req.exclude_weekdays.contains(&day.weekday()) {
                continue;
            }
            let found = result.candidates.iter().any(|s| s.start.date_naive() == day);
            prop_assert_eq!(found, fits, "day {} found={} fits={}", day, found, fits);
        }
    }

    #[test]
    fn search_is_pure(busy in arb_busy(), req in arb_request()) {
        prop_assert_eq!(find_slots(&busy, &req).unwrap(), find_slots(&busy, &req).unwrap());
    }
}
