//! Slot resolution — what a tap on one half-hour cell means.
//!
//! Given a reconciled day and an instant, decide whether the tap opens a
//! lesson, pre-fills a booking dialog from availability, or pre-fills an
//! empty-slot booking. Precedence is fixed: an ad-hoc slot starting exactly
//! here beats everything, then booked lessons, then availability, then the
//! empty fallback. A cell inside a lesson's span but away from its anchor
//! resolves to nothing at all: the anchor cell already owns the lesson.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::types::{AdHocSlot, CalendarEvent, EventSource, Lesson, SLOT_MINUTES};

/// Default booking length when the tapped cell has no availability under it.
const DEFAULT_EMPTY_MINUTES: i64 = 60;

/// Outcome of resolving one tapped cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Resolution {
    /// The cell is a lesson's anchor; open its detail view.
    Lesson { lesson: Lesson },
    /// The cell sits on open availability; pre-fill a booking dialog.
    Available {
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        location: Option<String>,
    },
    /// Nothing scheduled here; pre-fill a blank booking dialog.
    Empty {
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        location: Option<String>,
    },
}

/// Resolve a tap at `time` on `date`.
///
/// `day_events` is the reconciled bucket for that date and `ad_hoc` the raw
/// ad-hoc slot list; the exact-start check runs against the raw list so that
/// a coach-created slot keeps its authored bounds even after busy
/// subtraction trimmed the displayed segment. Returns `None` for
/// continuation cells inside a lesson's span.
pub fn resolve_slot(
    day_events: &[CalendarEvent],
    ad_hoc: &[AdHocSlot],
    courts: &[String],
    date: NaiveDate,
    time: NaiveTime,
) -> Option<Resolution> {
    let at = date.and_time(time);

    if let Some(slot) = ad_hoc.iter().find(|s| s.date == date && s.start == time) {
        return Some(Resolution::Available {
            date,
            start: slot.start,
            end: slot.end,
            location: slot.location.clone().or_else(|| default_court(courts)),
        });
    }

    // An anchored lesson wins over another lesson's continuation when the
    // coach double-booked the cell.
    let mut covered_by_lesson = false;
    for event in day_events {
        if let EventSource::Lesson(lesson) = &event.source {
            if event.is_anchor_at(at) {
                return Some(Resolution::Lesson {
                    lesson: lesson.clone(),
                });
            }
            if lesson.contains(at) {
                covered_by_lesson = true;
            }
        }
    }
    if covered_by_lesson {
        return None;
    }

    for event in day_events {
        if let EventSource::Availability(segment) = &event.source {
            if segment.contains(time) {
                return Some(Resolution::Available {
                    date,
                    start: time,
                    end: default_booking_end(time, segment.end),
                    location: segment.location.clone().or_else(|| default_court(courts)),
                });
            }
        }
    }

    Some(Resolution::Empty {
        date,
        start: time,
        end: bounded_end(time, DEFAULT_EMPTY_MINUTES),
        location: default_court(courts),
    })
}

/// Round the remaining run of the segment to the nearest half-hour count
/// (half rounds up, never below one increment). The result is only a dialog
/// default and may extend past the segment end.
fn default_booking_end(start: NaiveTime, segment_end: NaiveTime) -> NaiveTime {
    let remaining = (segment_end - start).num_minutes();
    let increments = ((remaining + SLOT_MINUTES / 2) / SLOT_MINUTES).max(1);
    bounded_end(start, increments * SLOT_MINUTES)
}

/// `start + minutes`, saturating at 23:59 instead of wrapping past midnight.
fn bounded_end(start: NaiveTime, minutes: i64) -> NaiveTime {
    let (end, overflow) = start.overflowing_add_signed(Duration::minutes(minutes));
    if overflow == 0 {
        end
    } else {
        NaiveTime::MIN + Duration::minutes(24 * 60 - 1)
    }
}

fn default_court(courts: &[String]) -> Option<String> {
    courts.first().cloned()
}
