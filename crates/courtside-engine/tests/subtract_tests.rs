//! Tests for busy-time subtraction — truncation, splitting, removal, and the
//! day-scoping rules that decide which busy intervals touch which windows.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use courtside_engine::subtract::subtract_busy;
use courtside_engine::types::{AvailWindow, BusyInterval, WindowOrigin};

fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn dt(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    d(year, month, day).and_time(t(hour, minute))
}

fn window(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> AvailWindow {
    AvailWindow {
        date,
        start,
        end,
        location: None,
        origin: WindowOrigin::Weekly,
    }
}

fn busy(start: NaiveDateTime, end: NaiveDateTime) -> BusyInterval {
    BusyInterval {
        start,
        end,
        all_day: false,
        label: None,
    }
}

fn all_day(first: NaiveDate, last_exclusive: NaiveDate) -> BusyInterval {
    BusyInterval {
        start: first.and_time(NaiveTime::MIN),
        end: last_exclusive.and_time(NaiveTime::MIN),
        all_day: true,
        label: None,
    }
}

#[test]
fn disjoint_busy_leaves_window_unchanged() {
    let windows = vec![window(d(2026, 3, 16), t(9, 0), t(12, 0))];
    let busy = vec![busy(dt(2026, 3, 16, 13, 0), dt(2026, 3, 16, 14, 0))];

    let segments = subtract_busy(&windows, &busy);

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].start, t(9, 0));
    assert_eq!(segments[0].end, t(12, 0));
}

#[test]
fn busy_inside_window_splits_it_in_two() {
    // Monday 09:00-12:00 minus a 10:00-10:30 appointment.
    let windows = vec![window(d(2026, 3, 16), t(9, 0), t(12, 0))];
    let busy = vec![busy(dt(2026, 3, 16, 10, 0), dt(2026, 3, 16, 10, 30))];

    let segments = subtract_busy(&windows, &busy);

    assert_eq!(segments.len(), 2, "one interior busy splits the window");
    assert_eq!((segments[0].start, segments[0].end), (t(9, 0), t(10, 0)));
    assert_eq!((segments[1].start, segments[1].end), (t(10, 30), t(12, 0)));
}

#[test]
fn head_overlap_truncates_start() {
    let windows = vec![window(d(2026, 3, 16), t(9, 0), t(12, 0))];
    let busy = vec![busy(dt(2026, 3, 16, 8, 30), dt(2026, 3, 16, 9, 30))];

    let segments = subtract_busy(&windows, &busy);

    assert_eq!(segments.len(), 1);
    assert_eq!((segments[0].start, segments[0].end), (t(9, 30), t(12, 0)));
}

#[test]
fn tail_overlap_truncates_end() {
    let windows = vec![window(d(2026, 3, 16), t(9, 0), t(12, 0))];
    let busy = vec![busy(dt(2026, 3, 16, 11, 0), dt(2026, 3, 16, 13, 0))];

    let segments = subtract_busy(&windows, &busy);

    assert_eq!(segments.len(), 1);
    assert_eq!((segments[0].start, segments[0].end), (t(9, 0), t(11, 0)));
}

#[test]
fn busy_equal_to_window_removes_it() {
    let windows = vec![window(d(2026, 3, 16), t(9, 0), t(12, 0))];
    let busy = vec![busy(dt(2026, 3, 16, 9, 0), dt(2026, 3, 16, 12, 0))];

    assert!(subtract_busy(&windows, &busy).is_empty());
}

#[test]
fn adjacent_busy_does_not_overlap() {
    // Half-open intervals: ending exactly at the window start is disjoint.
    let windows = vec![window(d(2026, 3, 16), t(9, 0), t(12, 0))];
    let busy = vec![
        busy(dt(2026, 3, 16, 8, 0), dt(2026, 3, 16, 9, 0)),
        busy(dt(2026, 3, 16, 12, 0), dt(2026, 3, 16, 13, 0)),
    ];

    let segments = subtract_busy(&windows, &busy);

    assert_eq!(segments.len(), 1);
    assert_eq!((segments[0].start, segments[0].end), (t(9, 0), t(12, 0)));
}

#[test]
fn multiple_busy_carve_multiple_gaps() {
    let windows = vec![window(d(2026, 3, 16), t(8, 0), t(18, 0))];
    let busy = vec![
        busy(dt(2026, 3, 16, 9, 0), dt(2026, 3, 16, 10, 0)),
        busy(dt(2026, 3, 16, 12, 0), dt(2026, 3, 16, 13, 30)),
    ];

    let segments = subtract_busy(&windows, &busy);

    assert_eq!(segments.len(), 3);
    assert_eq!((segments[0].start, segments[0].end), (t(8, 0), t(9, 0)));
    assert_eq!((segments[1].start, segments[1].end), (t(10, 0), t(12, 0)));
    assert_eq!((segments[2].start, segments[2].end), (t(13, 30), t(18, 0)));
}

#[test]
fn all_day_busy_blanks_only_its_days() {
    let windows = vec![
        window(d(2026, 3, 16), t(9, 0), t(12, 0)),
        window(d(2026, 3, 17), t(9, 0), t(12, 0)),
    ];
    let busy = vec![all_day(d(2026, 3, 16), d(2026, 3, 17))];

    let segments = subtract_busy(&windows, &busy);

    assert_eq!(segments.len(), 1, "Monday is blanked, Tuesday survives");
    assert_eq!(segments[0].date, d(2026, 3, 17));
}

#[test]
fn timed_busy_on_another_day_is_ignored() {
    let windows = vec![window(d(2026, 3, 16), t(9, 0), t(12, 0))];
    let busy = vec![busy(dt(2026, 3, 17, 9, 0), dt(2026, 3, 17, 12, 0))];

    let segments = subtract_busy(&windows, &busy);

    assert_eq!(segments.len(), 1);
    assert_eq!((segments[0].start, segments[0].end), (t(9, 0), t(12, 0)));
}

#[test]
fn overnight_busy_belongs_to_its_start_date() {
    // 20:00 Monday to 02:00 Tuesday: subtracts from Monday evening, but is
    // keyed to Monday, so a Tuesday-morning window is untouched.
    let overnight = busy(dt(2026, 3, 16, 20, 0), dt(2026, 3, 17, 2, 0));
    let windows = vec![
        window(d(2026, 3, 16), t(18, 0), t(22, 0)),
        window(d(2026, 3, 17), t(6, 0), t(8, 0)),
    ];

    let segments = subtract_busy(&windows, &[overnight]);

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].date, d(2026, 3, 16));
    assert_eq!((segments[0].start, segments[0].end), (t(18, 0), t(20, 0)));
    assert_eq!(segments[1].date, d(2026, 3, 17));
    assert_eq!((segments[1].start, segments[1].end), (t(6, 0), t(8, 0)));
}

#[test]
fn segments_keep_location_and_origin() {
    let windows = vec![AvailWindow {
        date: d(2026, 3, 16),
        start: t(9, 0),
        end: t(12, 0),
        location: Some("Court B".to_string()),
        origin: WindowOrigin::AdHoc {
            source_id: "s7".to_string(),
        },
    }];
    let busy = vec![busy(dt(2026, 3, 16, 10, 0), dt(2026, 3, 16, 11, 0))];

    let segments = subtract_busy(&windows, &busy);

    assert_eq!(segments.len(), 2);
    for segment in &segments {
        assert_eq!(segment.location.as_deref(), Some("Court B"));
        assert_eq!(
            segment.origin,
            WindowOrigin::AdHoc {
                source_id: "s7".to_string()
            }
        );
    }
}

#[test]
fn no_busy_passes_windows_through() {
    let windows = vec![
        window(d(2026, 3, 17), t(14, 0), t(16, 0)),
        window(d(2026, 3, 16), t(9, 0), t(12, 0)),
    ];

    let segments = subtract_busy(&windows, &[]);

    assert_eq!(segments.len(), 2);
    // Output is (date, start)-ordered regardless of input order.
    assert_eq!(segments[0].date, d(2026, 3, 16));
    assert_eq!(segments[1].date, d(2026, 3, 17));
}
