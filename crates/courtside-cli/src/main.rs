//! `courtside` CLI — render and query a coach's reconciled week from raw
//! backend payload files.
//!
//! ## Usage
//!
//! ```sh
//! # Render the week grid around a date
//! courtside week --lessons lessons.json --availability availability.json \
//!     --busy busy.json --date 2026-03-16
//!
//! # Agenda for three days starting Tuesday
//! courtside agenda --availability availability.json --date 2026-03-17 --span 3day
//!
//! # What does a tap on Monday 10:15 mean?
//! courtside resolve --availability availability.json --busy busy.json \
//!     --date 2026-03-16 --time 10:15
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use courtside_engine::state::{ScheduleState, SourceKind};
use courtside_engine::types::{CalendarEvent, DateSpan, EventSource, LessonStatus, LessonType};
use courtside_engine::view::{GridCell, MobileSpan, MobileView, WeekGrid};

#[derive(Parser)]
#[command(
    name = "courtside",
    version,
    about = "Coach calendar reconciliation: lessons + availability - busy"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the Sunday-start week grid containing a date
    Week {
        #[command(flatten)]
        sources: SourceArgs,
        /// Any date inside the week to render (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List reconciled events day by day
    Agenda {
        #[command(flatten)]
        sources: SourceArgs,
        /// First day of the agenda (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// How many days to show: day, 3day, or week
        #[arg(long, value_parser = parse_span, default_value = "week")]
        span: MobileSpan,
    },
    /// Resolve a tap on one half-hour cell, printing the outcome as JSON
    Resolve {
        #[command(flatten)]
        sources: SourceArgs,
        /// The tapped day (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// The tapped cell time, HH:MM
        #[arg(long, value_parser = parse_time)]
        time: NaiveTime,
    },
}

/// Payload files for the three backend sources. A missing file means that
/// source simply has no data.
#[derive(Args)]
struct SourceArgs {
    /// Lessons payload JSON file
    #[arg(long)]
    lessons: Option<PathBuf>,
    /// Availability payload JSON file (weekly rules + ad-hoc slots)
    #[arg(long)]
    availability: Option<PathBuf>,
    /// Busy-events payload JSON file
    #[arg(long)]
    busy: Option<PathBuf>,
    /// Comma-separated court names; the first is the booking default
    #[arg(long, value_delimiter = ',', default_value = "Court 1")]
    courts: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Week { sources, date } => {
            let mut state = load_state(&sources)?;
            let date = date.unwrap_or_else(today);
            let grid = WeekGrid::build(state.reconciled(DateSpan::week_of(date)), date);
            print!("{}", render_week(&grid));
        }
        Commands::Agenda {
            sources,
            date,
            span,
        } => {
            let mut state = load_state(&sources)?;
            let date = date.unwrap_or_else(today);
            let range = DateSpan::starting(date, span.days());
            let view = MobileView::build(state.reconciled(range), date, span);
            print!("{}", render_agenda(&view));
        }
        Commands::Resolve {
            sources,
            date,
            time,
        } => {
            let mut state = load_state(&sources)?;
            let date = date.unwrap_or_else(today);
            let resolution = state.resolve_slot(date, time);
            println!("{}", serde_json::to_string_pretty(&resolution)?);
        }
    }

    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Feed each provided payload file through the normal fetch path, so the CLI
/// sees exactly what a host application would.
fn load_state(args: &SourceArgs) -> Result<ScheduleState> {
    let mut state = ScheduleState::new(args.courts.clone());

    let feeds = [
        (SourceKind::Lessons, &args.lessons),
        (SourceKind::Availability, &args.availability),
        (SourceKind::Busy, &args.busy),
    ];
    for (kind, path) in feeds {
        if let Some(path) = path {
            let payload = read_json(path)?;
            let ticket = state.begin_fetch(kind);
            state.complete_fetch(ticket, Ok(&payload));
        }
    }
    Ok(state)
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| format!("invalid time {raw:?} (expected HH:MM)"))
}

fn parse_span(raw: &str) -> Result<MobileSpan, String> {
    match raw.to_ascii_lowercase().as_str() {
        "day" | "1day" => Ok(MobileSpan::Day),
        "3day" | "3-day" | "three-day" => Ok(MobileSpan::ThreeDay),
        "week" | "7day" => Ok(MobileSpan::Week),
        other => Err(format!("unknown span {other:?} (expected day, 3day, or week)")),
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

const CELL_WIDTH: usize = 8;

fn render_week(grid: &WeekGrid) -> String {
    let week = DateSpan::starting(grid.week_start, 7);
    let mut out = String::new();

    out.push_str(&format!("Week of {}\n", grid.week_start));
    out.push_str(&format!("{:<6}", "Time"));
    for date in week.dates() {
        out.push_str(&format!("| {:<w$}", date.format("%a %d"), w = CELL_WIDTH));
    }
    out.push('\n');
    out.push_str(&"-".repeat(6 + 7 * (CELL_WIDTH + 2)));
    out.push('\n');

    for row in &grid.rows {
        out.push_str(&format!("{:<6}", row.time.format("%H:%M")));
        for cell in &row.cells {
            out.push_str(&format!("| {:<w$}", clip(&cell_text(cell)), w = CELL_WIDTH));
        }
        out.push('\n');
    }
    out
}

fn cell_text(cell: &GridCell) -> String {
    match cell {
        GridCell::Lesson { lesson, .. } => {
            let label = if lesson.participant_label.is_empty() {
                "lesson"
            } else {
                &lesson.participant_label
            };
            if lesson.status == LessonStatus::Cancelled {
                format!("x {label}")
            } else {
                label.to_string()
            }
        }
        GridCell::Continuation => "|".to_string(),
        GridCell::Available { location } => {
            location.clone().unwrap_or_else(|| "open".to_string())
        }
        GridCell::Busy { label } => label.clone().unwrap_or_else(|| "busy".to_string()),
        GridCell::Empty => ".".to_string(),
    }
}

fn clip(text: &str) -> String {
    text.chars().take(CELL_WIDTH).collect()
}

fn render_agenda(view: &MobileView) -> String {
    let mut out = String::new();
    for day in &view.days {
        out.push_str(&format!("{}\n", day.date.format("%a %Y-%m-%d")));
        if day.events.is_empty() {
            out.push_str("  (no entries)\n");
            continue;
        }
        for event in &day.events {
            out.push_str(&format!("  {}\n", event_line(event)));
        }
    }
    out
}

fn event_line(event: &CalendarEvent) -> String {
    let times = format!(
        "{}-{}",
        event.start.format("%H:%M"),
        event.end.format("%H:%M")
    );
    match &event.source {
        EventSource::Lesson(lesson) => {
            let label = if lesson.participant_label.is_empty() {
                "(unnamed)"
            } else {
                &lesson.participant_label
            };
            format!(
                "{times}  lesson  {label} ({}, {})",
                type_name(lesson.lesson_type),
                status_name(lesson.status)
            )
        }
        EventSource::Availability(segment) => {
            format!("{times}  open    {}", segment.location.as_deref().unwrap_or("-"))
        }
        EventSource::Busy(interval) if interval.all_day => {
            format!("all day      busy    {}", interval.label.as_deref().unwrap_or("-"))
        }
        EventSource::Busy(interval) => {
            format!("{times}  busy    {}", interval.label.as_deref().unwrap_or("-"))
        }
    }
}

fn type_name(lesson_type: LessonType) -> &'static str {
    match lesson_type {
        LessonType::Private => "private",
        LessonType::SemiPrivate => "semi-private",
        LessonType::Group => "group",
    }
}

fn status_name(status: LessonStatus) -> &'static str {
    match status {
        LessonStatus::Pending => "pending",
        LessonStatus::Confirmed => "confirmed",
        LessonStatus::Cancelled => "cancelled",
    }
}
