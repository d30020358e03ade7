//! View adapters — the desktop week grid and the mobile agenda strips.
//!
//! Both are thin projections over a [`Reconciled`] surface. The grid is a
//! fixed half-hour ladder crossed with the seven days of a Sunday-start
//! week; the mobile view is a run of per-day event lists sized by the
//! selected span. Neither touches the raw source lists.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::reconcile::Reconciled;
use crate::types::{CalendarEvent, DateSpan, EventSource, Lesson, SLOT_MINUTES};

/// Hour of the first ladder row.
const GRID_OPENING_HOUR: i64 = 6;

/// Rows in the ladder: 06:00 through 21:30 inclusive.
pub const GRID_ROWS: usize = 32;

fn grid_opening() -> NaiveTime {
    NaiveTime::MIN + Duration::hours(GRID_OPENING_HOUR)
}

/// The half-hour ladder drawn down the left edge of the grid.
pub fn grid_times() -> impl Iterator<Item = NaiveTime> {
    (0..GRID_ROWS).map(|row| grid_opening() + Duration::minutes(row as i64 * SLOT_MINUTES))
}

/// One rendered cell of the week grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cell", rename_all = "kebab-case")]
pub enum GridCell {
    /// A lesson anchored at this cell, drawn spanning `span_slots` rows.
    Lesson { lesson: Lesson, span_slots: u32 },
    /// Covered by a lesson anchored in an earlier row; drawn blank.
    Continuation,
    Available { location: Option<String> },
    Busy { label: Option<String> },
    Empty,
}

/// One ladder row: a time plus seven cells, Sunday first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub time: NaiveTime,
    pub cells: Vec<GridCell>,
}

/// The desktop week view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekGrid {
    /// The Sunday opening the rendered week.
    pub week_start: NaiveDate,
    pub rows: Vec<GridRow>,
}

impl WeekGrid {
    /// Render the grid for the week containing `reference`.
    ///
    /// Days the reconciled surface does not cover simply render as empty
    /// columns; the grid never recomputes sources itself.
    pub fn build(reconciled: &Reconciled, reference: NaiveDate) -> WeekGrid {
        let week = DateSpan::week_of(reference);
        let rows = grid_times()
            .map(|time| GridRow {
                time,
                cells: week
                    .dates()
                    .map(|date| cell_at(reconciled.day(date), date, time))
                    .collect(),
            })
            .collect();
        WeekGrid {
            week_start: week.start,
            rows,
        }
    }
}

/// Classify one cell. Lessons outrank availability, availability outranks
/// busy, and within lessons an anchor beats another lesson's continuation so
/// a double-booked cell still shows one of its lessons.
fn cell_at(day_events: &[CalendarEvent], date: NaiveDate, slot: NaiveTime) -> GridCell {
    let at = date.and_time(slot);

    let mut continuation = false;
    for event in day_events {
        if let EventSource::Lesson(lesson) = &event.source {
            if event.is_anchor_at(at) {
                return GridCell::Lesson {
                    lesson: lesson.clone(),
                    span_slots: span_slots(lesson),
                };
            }
            if lesson.contains(at) {
                continuation = true;
            }
        }
    }
    if continuation {
        return GridCell::Continuation;
    }

    for event in day_events {
        if let EventSource::Availability(segment) = &event.source {
            if segment.contains(slot) {
                return GridCell::Available {
                    location: segment.location.clone(),
                };
            }
        }
    }

    for event in day_events {
        if let EventSource::Busy(interval) = &event.source {
            if event.covers(at) {
                return GridCell::Busy {
                    label: interval.label.clone(),
                };
            }
        }
    }

    GridCell::Empty
}

/// Rows a lesson occupies, rounding partial cells up.
fn span_slots(lesson: &Lesson) -> u32 {
    let minutes = lesson.duration_minutes();
    ((minutes + SLOT_MINUTES - 1) / SLOT_MINUTES).max(1) as u32
}

/// How many days the mobile view shows at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MobileSpan {
    Day,
    ThreeDay,
    Week,
}

impl MobileSpan {
    pub fn days(self) -> u32 {
        match self {
            MobileSpan::Day => 1,
            MobileSpan::ThreeDay => 3,
            MobileSpan::Week => 7,
        }
    }

    /// Page the view start forward (or back, for negative `steps`) by whole
    /// spans.
    pub fn advance(self, start: NaiveDate, steps: i64) -> NaiveDate {
        start + Duration::days(steps * i64::from(self.days()))
    }
}

/// One day of the agenda strip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MobileDay {
    pub date: NaiveDate,
    pub events: Vec<CalendarEvent>,
}

/// The mobile agenda: consecutive days, each with its bucket of events in
/// reconciled order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MobileView {
    pub days: Vec<MobileDay>,
}

impl MobileView {
    pub fn build(reconciled: &Reconciled, start: NaiveDate, span: MobileSpan) -> MobileView {
        let range = DateSpan::starting(start, span.days());
        MobileView {
            days: range
                .dates()
                .map(|date| MobileDay {
                    date,
                    events: reconciled.day(date).to_vec(),
                })
                .collect(),
        }
    }
}
