//! Event reconciliation — one ordered calendar surface from three event
//! families.
//!
//! Combines booked lessons, post-subtraction availability segments, and the
//! busy intervals themselves (kept visible for display even though already
//! consumed by subtraction) into a flat kind-tagged list plus per-day
//! buckets. Both the week grid and the mobile views read these buckets, so
//! date bucketing happens exactly once per recompute.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::project::availability_windows;
use crate::subtract::subtract_busy;
use crate::types::{
    AdHocSlot, BusyInterval, CalendarEvent, DateSpan, EventKind, EventSource, Lesson, WeeklyRule,
};

/// Borrowed view of the four raw source lists. A source that has not loaded
/// yet is simply an empty slice — reconciliation never blocks on partial
/// readiness.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleSources<'a> {
    pub lessons: &'a [Lesson],
    pub weekly_rules: &'a [WeeklyRule],
    pub ad_hoc: &'a [AdHocSlot],
    pub busy: &'a [BusyInterval],
}

/// The reconciled calendar surface for one visible range. A pure projection:
/// recomputed whenever the range or any source list changes, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciled {
    pub range: DateSpan,
    /// Every event exactly once, sorted by (start, kind rank, end).
    pub events: Vec<CalendarEvent>,
    /// Per-day buckets in the same order. Multi-day all-day busy intervals
    /// appear in the bucket of every date they cover inside the range.
    pub by_day: BTreeMap<NaiveDate, Vec<CalendarEvent>>,
}

impl Reconciled {
    /// The day bucket for a date, empty when nothing falls on it.
    pub fn day(&self, date: NaiveDate) -> &[CalendarEvent] {
        self.by_day.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Merge the sources into one reconciled surface for the visible range.
///
/// Guarantees: events in the flat list and in every day bucket are sorted by
/// start time ascending; a lesson spanning several half-hour cells appears
/// exactly once, with its anchor fixed to its own start time (renderers draw
/// it only there and leave continuation cells blank); day buckets never hold
/// an availability segment overlapping a busy interval, because busy was
/// subtracted first.
pub fn reconcile(sources: ScheduleSources<'_>, range: DateSpan) -> Reconciled {
    let mut events = Vec::new();

    for lesson in sources.lessons {
        if range.contains(lesson.start.date()) {
            events.push(CalendarEvent {
                start: lesson.start,
                end: lesson.end,
                kind: EventKind::Lesson,
                anchor: lesson.start.time(),
                source: EventSource::Lesson(lesson.clone()),
            });
        }
    }

    let windows = availability_windows(sources.weekly_rules, sources.ad_hoc, range);
    for segment in subtract_busy(&windows, sources.busy) {
        events.push(CalendarEvent {
            start: segment.date.and_time(segment.start),
            end: segment.date.and_time(segment.end),
            kind: EventKind::Availability,
            anchor: segment.start,
            source: EventSource::Availability(segment),
        });
    }

    for interval in sources.busy {
        let touches_range = range.dates().any(|date| interval.covers_day(date));
        if touches_range {
            events.push(CalendarEvent {
                start: interval.start,
                end: interval.end,
                kind: EventKind::Busy,
                anchor: interval.start.time(),
                source: EventSource::Busy(interval.clone()),
            });
        }
    }

    events.sort_by_key(sort_key);

    // Bucket the sorted list; iteration order keeps each bucket sorted too.
    let mut by_day: BTreeMap<NaiveDate, Vec<CalendarEvent>> = BTreeMap::new();
    for event in &events {
        match &event.source {
            EventSource::Busy(interval) => {
                for date in range.dates().filter(|date| interval.covers_day(*date)) {
                    by_day.entry(date).or_default().push(event.clone());
                }
            }
            _ => {
                by_day
                    .entry(event.start.date())
                    .or_default()
                    .push(event.clone());
            }
        }
    }

    Reconciled {
        range,
        events,
        by_day,
    }
}

fn sort_key(event: &CalendarEvent) -> (NaiveDateTime, u8, NaiveDateTime) {
    (event.start, event.kind.rank(), event.end)
}
