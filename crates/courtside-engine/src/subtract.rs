//! Interval subtraction — availability minus busy time.
//!
//! Each availability window starts as a single open segment; every busy
//! interval touching that window's day refines the current segment list in
//! sequence. What survives is the "available minus meetings" view, without
//! the backend having to pre-compute free time.

use chrono::NaiveDateTime;

use crate::types::{overlaps, AvailWindow, BusyInterval, FreeSegment};

/// Subtract busy time from availability windows, yielding the remaining free
/// segments retagged with each source window's location and origin.
///
/// A busy interval applies to a window when it covers the window's calendar
/// date (timed intervals belong to their start date; all-day intervals cover
/// every date up to their exclusive end). An all-day interval removes the
/// whole window. Otherwise, per segment: disjoint busy leaves it unchanged;
/// busy over the head or tail truncates it; busy strictly inside splits it in
/// two; a segment fully contained in busy is removed.
///
/// Output is ordered by (date, start).
pub fn subtract_busy(windows: &[AvailWindow], busy: &[BusyInterval]) -> Vec<FreeSegment> {
    let mut segments = Vec::new();
    for window in windows {
        carve_window(window, busy, &mut segments);
    }
    segments.sort_by_key(|segment| (segment.date, segment.start, segment.end));
    segments
}

/// Apply every relevant busy interval to one window, appending the surviving
/// segments. Works in `NaiveDateTime` space so overnight busy intervals
/// subtract correctly without wrapping.
fn carve_window(window: &AvailWindow, busy: &[BusyInterval], out: &mut Vec<FreeSegment>) {
    let day_start = window.date.and_time(window.start);
    let day_end = window.date.and_time(window.end);
    let mut pieces: Vec<(NaiveDateTime, NaiveDateTime)> = vec![(day_start, day_end)];

    for interval in busy.iter().filter(|b| b.covers_day(window.date)) {
        if interval.all_day {
            pieces.clear();
        } else {
            pieces = subtract_interval(pieces, interval.start, interval.end);
        }
        if pieces.is_empty() {
            break;
        }
    }

    out.extend(pieces.into_iter().map(|(start, end)| FreeSegment {
        date: window.date,
        start: start.time(),
        end: end.time(),
        location: window.location.clone(),
        origin: window.origin.clone(),
    }));
}

/// One refinement step: remove `[busy_start, busy_end)` from every piece.
fn subtract_interval(
    pieces: Vec<(NaiveDateTime, NaiveDateTime)>,
    busy_start: NaiveDateTime,
    busy_end: NaiveDateTime,
) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let mut refined = Vec::with_capacity(pieces.len() + 1);
    for (start, end) in pieces {
        if !overlaps(start, end, busy_start, busy_end) {
            refined.push((start, end));
            continue;
        }
        // Keep whatever sticks out on either side of the busy interval; a
        // piece inside it contributes nothing, one straddling it contributes
        // both sides.
        if start < busy_start {
            refined.push((start, busy_start));
        }
        if end > busy_end {
            refined.push((busy_end, end));
        }
    }
    refined
}
