//! Tests for the view adapters — grid cell classification, lesson spans, and
//! mobile span paging.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use courtside_engine::reconcile::{reconcile, Reconciled, ScheduleSources};
use courtside_engine::types::{
    BusyInterval, CalendarEvent, DateSpan, EventKind, EventSource, Lesson, LessonStatus,
    LessonType, WeeklyRule,
};
use courtside_engine::view::{
    grid_times, GridCell, GridRow, MobileSpan, MobileView, WeekGrid, GRID_ROWS,
};

fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn dt(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    d(year, month, day).and_time(t(hour, minute))
}

fn lesson(id: &str, start: NaiveDateTime, end: NaiveDateTime) -> Lesson {
    Lesson {
        id: id.to_string(),
        start,
        end,
        lesson_type: LessonType::Private,
        status: LessonStatus::Confirmed,
        participant_label: "Ava".to_string(),
        location: None,
    }
}

fn rule(weekday: Weekday, start: NaiveTime, end: NaiveTime, location: Option<&str>) -> WeeklyRule {
    WeeklyRule {
        weekday,
        start,
        end,
        location: location.map(String::from),
    }
}

fn week_surface(
    lessons: &[Lesson],
    rules: &[WeeklyRule],
    busy: &[BusyInterval],
    reference: NaiveDate,
) -> Reconciled {
    reconcile(
        ScheduleSources {
            lessons,
            weekly_rules: rules,
            ad_hoc: &[],
            busy,
        },
        DateSpan::week_of(reference),
    )
}

fn row_at(grid: &WeekGrid, time: NaiveTime) -> &GridRow {
    grid.rows
        .iter()
        .find(|row| row.time == time)
        .unwrap_or_else(|| panic!("no grid row at {time}"))
}

// Sunday-first columns: 2026-03-16 is the Monday of its week, column 1.
const MONDAY: usize = 1;

#[test]
fn ladder_runs_six_to_half_past_nine() {
    let times: Vec<NaiveTime> = grid_times().collect();

    assert_eq!(times.len(), GRID_ROWS);
    assert_eq!(times[0], t(6, 0));
    assert_eq!(times[1], t(6, 30));
    assert_eq!(times[31], t(21, 30));
}

#[test]
fn grid_is_seven_columns_by_thirty_two_rows() {
    let surface = week_surface(&[], &[], &[], d(2026, 3, 18));

    let grid = WeekGrid::build(&surface, d(2026, 3, 18));

    assert_eq!(grid.week_start, d(2026, 3, 15));
    assert_eq!(grid.rows.len(), GRID_ROWS);
    for row in &grid.rows {
        assert_eq!(row.cells.len(), 7);
    }
}

#[test]
fn lesson_anchors_once_and_continues_below() {
    // 90 minutes at Monday 14:00: anchor at 14:00 spanning three rows,
    // continuations at 14:30 and 15:00, free again at 15:30.
    let lessons = vec![lesson("l1", dt(2026, 3, 16, 14, 0), dt(2026, 3, 16, 15, 30))];
    let surface = week_surface(&lessons, &[], &[], d(2026, 3, 16));

    let grid = WeekGrid::build(&surface, d(2026, 3, 16));

    match &row_at(&grid, t(14, 0)).cells[MONDAY] {
        GridCell::Lesson { lesson, span_slots } => {
            assert_eq!(lesson.id, "l1");
            assert_eq!(*span_slots, 3);
        }
        other => panic!("expected the lesson anchor, got {other:?}"),
    }
    assert_eq!(row_at(&grid, t(14, 30)).cells[MONDAY], GridCell::Continuation);
    assert_eq!(row_at(&grid, t(15, 0)).cells[MONDAY], GridCell::Continuation);
    assert_eq!(row_at(&grid, t(15, 30)).cells[MONDAY], GridCell::Empty);
}

#[test]
fn grid_draws_the_lesson_at_its_stored_anchor() {
    // Cell classification keys on the event's stored anchor, not the
    // lesson's start time: an anchor on 14:30 drags the card down a row and
    // leaves 14:00 as a continuation.
    let booked = lesson("l1", dt(2026, 3, 16, 14, 0), dt(2026, 3, 16, 15, 30));
    let event = CalendarEvent {
        start: booked.start,
        end: booked.end,
        kind: EventKind::Lesson,
        anchor: t(14, 30),
        source: EventSource::Lesson(booked),
    };
    let mut by_day = BTreeMap::new();
    by_day.insert(d(2026, 3, 16), vec![event.clone()]);
    let surface = Reconciled {
        range: DateSpan::week_of(d(2026, 3, 16)),
        events: vec![event],
        by_day,
    };

    let grid = WeekGrid::build(&surface, d(2026, 3, 16));

    match &row_at(&grid, t(14, 30)).cells[MONDAY] {
        GridCell::Lesson { lesson, .. } => assert_eq!(lesson.id, "l1"),
        other => panic!("expected the lesson anchor, got {other:?}"),
    }
    assert_eq!(row_at(&grid, t(14, 0)).cells[MONDAY], GridCell::Continuation);
}

#[test]
fn partial_slot_lessons_round_their_span_up() {
    let lessons = vec![lesson("l1", dt(2026, 3, 16, 14, 0), dt(2026, 3, 16, 14, 45))];
    let surface = week_surface(&lessons, &[], &[], d(2026, 3, 16));

    let grid = WeekGrid::build(&surface, d(2026, 3, 16));

    match &row_at(&grid, t(14, 0)).cells[MONDAY] {
        GridCell::Lesson { span_slots, .. } => assert_eq!(*span_slots, 2),
        other => panic!("expected the lesson anchor, got {other:?}"),
    }
    assert_eq!(row_at(&grid, t(14, 30)).cells[MONDAY], GridCell::Continuation);
}

#[test]
fn availability_and_busy_cells_carry_their_labels() {
    // Monday 09:00-12:00 on Court A with a 10:00-10:30 appointment.
    let rules = vec![rule(Weekday::Mon, t(9, 0), t(12, 0), Some("Court A"))];
    let busy = vec![BusyInterval {
        start: dt(2026, 3, 16, 10, 0),
        end: dt(2026, 3, 16, 10, 30),
        all_day: false,
        label: Some("Dentist".to_string()),
    }];
    let surface = week_surface(&[], &rules, &busy, d(2026, 3, 16));

    let grid = WeekGrid::build(&surface, d(2026, 3, 16));

    assert_eq!(
        row_at(&grid, t(9, 0)).cells[MONDAY],
        GridCell::Available {
            location: Some("Court A".to_string())
        }
    );
    assert_eq!(
        row_at(&grid, t(10, 0)).cells[MONDAY],
        GridCell::Busy {
            label: Some("Dentist".to_string())
        }
    );
    assert_eq!(
        row_at(&grid, t(10, 30)).cells[MONDAY],
        GridCell::Available {
            location: Some("Court A".to_string())
        }
    );
    assert_eq!(row_at(&grid, t(12, 0)).cells[MONDAY], GridCell::Empty);
}

#[test]
fn all_day_busy_turns_the_whole_column_busy() {
    let rules = vec![rule(Weekday::Mon, t(9, 0), t(12, 0), None)];
    let busy = vec![BusyInterval {
        start: dt(2026, 3, 16, 0, 0),
        end: dt(2026, 3, 17, 0, 0),
        all_day: true,
        label: Some("Tournament".to_string()),
    }];
    let surface = week_surface(&[], &rules, &busy, d(2026, 3, 16));

    let grid = WeekGrid::build(&surface, d(2026, 3, 16));

    for row in &grid.rows {
        assert!(
            matches!(row.cells[MONDAY], GridCell::Busy { .. }),
            "cell at {} should be busy",
            row.time
        );
    }
}

#[test]
fn lesson_outranks_availability_in_its_cells() {
    let rules = vec![rule(Weekday::Mon, t(9, 0), t(12, 0), None)];
    let lessons = vec![lesson("l1", dt(2026, 3, 16, 9, 0), dt(2026, 3, 16, 10, 0))];
    let surface = week_surface(&lessons, &rules, &[], d(2026, 3, 16));

    let grid = WeekGrid::build(&surface, d(2026, 3, 16));

    assert!(matches!(
        row_at(&grid, t(9, 0)).cells[MONDAY],
        GridCell::Lesson { .. }
    ));
    assert_eq!(row_at(&grid, t(9, 30)).cells[MONDAY], GridCell::Continuation);
    assert!(matches!(
        row_at(&grid, t(10, 0)).cells[MONDAY],
        GridCell::Available { .. }
    ));
}

// ---------------------------------------------------------------------------
// Mobile spans
// ---------------------------------------------------------------------------

#[test]
fn span_sizes_and_paging() {
    assert_eq!(MobileSpan::Day.days(), 1);
    assert_eq!(MobileSpan::ThreeDay.days(), 3);
    assert_eq!(MobileSpan::Week.days(), 7);

    let start = d(2026, 3, 16);
    assert_eq!(MobileSpan::ThreeDay.advance(start, 1), d(2026, 3, 19));
    assert_eq!(MobileSpan::ThreeDay.advance(start, -1), d(2026, 3, 13));
    assert_eq!(MobileSpan::Week.advance(start, 2), d(2026, 3, 30));
    assert_eq!(MobileSpan::Day.advance(start, 0), start);
}

#[test]
fn mobile_view_lists_consecutive_days() {
    let lessons = vec![
        lesson("mon", dt(2026, 3, 16, 9, 0), dt(2026, 3, 16, 10, 0)),
        lesson("tue", dt(2026, 3, 17, 9, 0), dt(2026, 3, 17, 10, 0)),
        lesson("fri", dt(2026, 3, 20, 9, 0), dt(2026, 3, 20, 10, 0)),
    ];
    let surface = week_surface(&lessons, &[], &[], d(2026, 3, 16));

    let view = MobileView::build(&surface, d(2026, 3, 16), MobileSpan::ThreeDay);

    assert_eq!(view.days.len(), 3);
    assert_eq!(view.days[0].date, d(2026, 3, 16));
    assert_eq!(view.days[2].date, d(2026, 3, 18));
    assert_eq!(view.days[0].events.len(), 1);
    assert_eq!(view.days[0].events[0].lesson().unwrap().id, "mon");
    assert!(view.days[2].events.is_empty(), "Wednesday is quiet");
}

#[test]
fn single_day_view_holds_one_bucket() {
    let lessons = vec![lesson("mon", dt(2026, 3, 16, 9, 0), dt(2026, 3, 16, 10, 0))];
    let surface = week_surface(&lessons, &[], &[], d(2026, 3, 16));

    let view = MobileView::build(&surface, d(2026, 3, 16), MobileSpan::Day);

    assert_eq!(view.days.len(), 1);
    assert_eq!(view.days[0].events.len(), 1);
}
