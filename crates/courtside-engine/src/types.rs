//! Canonical record types shared across the reconciliation pipeline.
//!
//! Raw backend payloads come in several shapes (see [`crate::normalize`]);
//! everything downstream of the normalizer works exclusively with the types
//! in this module. All times are wall-clock values in the coach's single
//! local time zone — `NaiveDate`/`NaiveTime`/`NaiveDateTime` throughout, no
//! zone conversion anywhere in the engine.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Width of one booking increment. Lesson durations, grid rows, and default
/// booking lengths are all expressed in half-hour steps.
pub const SLOT_MINUTES: i64 = 30;

/// A recurring weekly availability rule: "every Monday 09:00–12:00 at Court A".
///
/// Invariant: `start < end` (the normalizer drops violations). Belongs to one
/// coach and lives until removed through the edit flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRule {
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// Court name; `None` when the slot label had no location mapping.
    pub location: Option<String>,
}

/// A one-off availability slot, keyed by `(date, start)`.
///
/// Created by an explicit "add availability" action; never auto-expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdHocSlot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub location: Option<String>,
    /// Backend identifier of the slot record (empty when not yet persisted).
    pub source_id: String,
}

/// Externally-synced busy time. Read-only: consumed for subtraction and kept
/// visible for display, never created or mutated by this engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// All-day entries blank out every availability window on the days they
    /// cover (`[start.date, end.date)`, exclusive end).
    pub all_day: bool,
    pub label: Option<String>,
}

impl BusyInterval {
    /// Whether this interval affects the given calendar date.
    ///
    /// Timed intervals belong to the day they start on; all-day intervals
    /// cover every date in `[start.date, end.date)` (a zero-length all-day
    /// entry still covers its own start date).
    pub fn covers_day(&self, date: NaiveDate) -> bool {
        if self.all_day {
            let first = self.start.date();
            let last = self.end.date();
            if first == last {
                date == first
            } else {
                date >= first && date < last
            }
        } else {
            self.start.date() == date
        }
    }
}

/// Lesson format, as picked at booking time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LessonType {
    Private,
    SemiPrivate,
    Group,
}

impl LessonType {
    /// Tolerant parse of the backend's `type` strings. Accepts kebab, snake
    /// and camel spellings of "semi-private", case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "private" => Some(Self::Private),
            "semi-private" | "semi_private" | "semiprivate" => Some(Self::SemiPrivate),
            "group" => Some(Self::Group),
            _ => None,
        }
    }
}

/// Booking status as reported by the lesson backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl LessonStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// A booked lesson. Owned by the booking backend; the engine reads and
/// renders it, and mutations flow through the external lesson-update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub lesson_type: LessonType,
    pub status: LessonStatus,
    /// Display name for the student(s); empty when the payload had none.
    pub participant_label: String,
    pub location: Option<String>,
}

impl Lesson {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// `[start, end)` containment.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }
}

/// Where an availability window came from, preserved through subtraction so
/// the resolver can tell ad-hoc slots from recurring rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "origin")]
pub enum WindowOrigin {
    Weekly,
    AdHoc { source_id: String },
}

/// A concrete dated availability window, before busy subtraction.
///
/// Produced by projecting a [`WeeklyRule`] onto a date or passing an
/// [`AdHocSlot`] through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailWindow {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub location: Option<String>,
    pub origin: WindowOrigin,
}

/// A remaining free piece of an availability window after busy subtraction,
/// retagged with the source window's location and origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeSegment {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub location: Option<String>,
    pub origin: WindowOrigin,
}

impl FreeSegment {
    /// `[start, end)` containment on the segment's own day.
    pub fn contains(&self, at: NaiveTime) -> bool {
        self.start <= at && at < self.end
    }
}

/// Semantic tag on a reconciled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Lesson,
    Availability,
    Busy,
}

impl EventKind {
    /// Sort rank for events sharing a start time: lesson cards first, then
    /// open windows, then display-only busy blocks.
    pub(crate) fn rank(self) -> u8 {
        match self {
            EventKind::Lesson => 0,
            EventKind::Availability => 1,
            EventKind::Busy => 2,
        }
    }
}

/// The original record behind a reconciled event. Serialized untagged — the
/// sibling `kind` field already identifies the record shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventSource {
    Lesson(Lesson),
    Availability(FreeSegment),
    Busy(BusyInterval),
}

/// One entry in the reconciled calendar surface. Ephemeral — recomputed on
/// every upstream change, never persisted, no identity of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub kind: EventKind,
    /// The one grid-slot time that renders this event, fixed at reconcile
    /// time (== `start.time()`). Cells at other covered times are
    /// continuations and stay blank.
    pub anchor: NaiveTime,
    pub source: EventSource,
}

impl CalendarEvent {
    /// Whether `at` is this event's anchor cell. The anchor lives on the
    /// event's start date, so an event spanning several days anchors on
    /// exactly one of them.
    pub fn is_anchor_at(&self, at: NaiveDateTime) -> bool {
        self.start.date() == at.date() && self.anchor == at.time()
    }

    /// `[start, end)` containment.
    pub fn covers(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }

    pub fn lesson(&self) -> Option<&Lesson> {
        match &self.source {
            EventSource::Lesson(lesson) => Some(lesson),
            _ => None,
        }
    }

    pub fn free_segment(&self) -> Option<&FreeSegment> {
        match &self.source {
            EventSource::Availability(segment) => Some(segment),
            _ => None,
        }
    }

    pub fn busy(&self) -> Option<&BusyInterval> {
        match &self.source {
            EventSource::Busy(busy) => Some(busy),
            _ => None,
        }
    }
}

/// A contiguous run of visible calendar dates.
///
/// The week view uses Sunday-start weeks; mobile views use 1/3/7-day spans
/// anchored wherever navigation left them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub days: u32,
}

impl DateSpan {
    /// The Sunday-start week containing `reference`.
    pub fn week_of(reference: NaiveDate) -> Self {
        let offset = reference.weekday().num_days_from_sunday();
        Self {
            start: reference - Duration::days(i64::from(offset)),
            days: 7,
        }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, days: 1 }
    }

    pub fn starting(start: NaiveDate, days: u32) -> Self {
        Self {
            start,
            days: days.max(1),
        }
    }

    /// First date after the span.
    pub fn end_exclusive(&self) -> NaiveDate {
        self.start + Duration::days(i64::from(self.days))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end_exclusive()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let start = self.start;
        (0..self.days).map(move |i| start + Duration::days(i64::from(i)))
    }
}

/// Half-open interval overlap: `[a_start, a_end)` vs `[b_start, b_end)`.
/// Adjacency (one ends exactly where the other starts) does not overlap.
pub(crate) fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}
