//! Raw payload normalization — backend JSON shapes → canonical records.
//!
//! The three upstream collaborators (`getLessons`, `getAvailability`,
//! `getBusyEvents`) return JSON whose shape drifted over time: collections
//! arrive bare or wrapped, the same semantic field goes by several names, and
//! timestamps are local wall-clock values mislabeled as UTC. Each entity gets
//! one adapter function that tries an ordered list of field-path candidates.
//!
//! Error policy: a record that cannot be normalized is dropped and the rest
//! of the batch is kept — a partial calendar beats an empty one. Nothing in
//! this module returns an error or panics on arbitrary JSON input.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde_json::Value;

use crate::types::{AdHocSlot, BusyInterval, Lesson, LessonStatus, LessonType, WeeklyRule};

/// Canonical availability payload: recurring weekly rules plus ad-hoc slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityData {
    pub weekly: Vec<WeeklyRule>,
    pub ad_hoc: Vec<AdHocSlot>,
}

/// Normalize a lessons payload. Accepts a bare array or `{lessons|items|data: [...]}`.
pub fn normalize_lessons(payload: &Value) -> Vec<Lesson> {
    record_array(payload, &["lessons", "items", "data"])
        .iter()
        .filter_map(lesson_from_value)
        .collect()
}

/// Normalize an availability payload:
/// `{ weekly: {day: ["HH:MM - HH:MM", ...]}, weeklyLocations: {day: {label: court}}, adHoc: [...] }`,
/// optionally wrapped under `data` or `availability`.
pub fn normalize_availability(payload: &Value) -> AvailabilityData {
    let root = unwrap_object(payload, &["data", "availability"]);

    let mut weekly = Vec::new();
    if let Some(days) = root.get("weekly").and_then(Value::as_object) {
        let locations = root
            .get("weeklyLocations")
            .or_else(|| root.get("weekly_locations"))
            .and_then(Value::as_object);

        for (day_name, slots) in days {
            let Some(weekday) = parse_weekday(day_name) else {
                continue;
            };
            let day_locations = locations
                .and_then(|map| map.get(day_name))
                .and_then(Value::as_object);
            let Some(slots) = slots.as_array() else {
                continue;
            };
            for slot in slots {
                let Some(label) = slot.as_str() else {
                    continue;
                };
                let Some((start, end)) = parse_slot_label(label) else {
                    continue;
                };
                // Location is keyed by the original, untrimmed label string.
                let location = day_locations
                    .and_then(|map| map.get(label))
                    .and_then(Value::as_str)
                    .and_then(non_empty);
                weekly.push(WeeklyRule {
                    weekday,
                    start,
                    end,
                    location,
                });
            }
        }
    }

    let ad_hoc = root
        .get("adHoc")
        .or_else(|| root.get("ad_hoc"))
        .or_else(|| root.get("adhoc"))
        .map(|node| {
            record_array(node, &["items", "data"])
                .iter()
                .filter_map(ad_hoc_from_value)
                .collect()
        })
        .unwrap_or_default();

    AvailabilityData { weekly, ad_hoc }
}

/// Normalize an external-calendar busy payload (Google-Calendar-shaped
/// events: `start.dateTime|start.date`, `end.dateTime|end.date`, `summary`).
pub fn normalize_busy(payload: &Value) -> Vec<BusyInterval> {
    record_array(payload, &["items", "events", "data"])
        .iter()
        .filter_map(busy_from_value)
        .collect()
}

// ---------------------------------------------------------------------------
// Per-record adapters
// ---------------------------------------------------------------------------

fn lesson_from_value(record: &Value) -> Option<Lesson> {
    let start = lesson_start(record)?;
    let end = lesson_end(record, start)?;
    if end <= start {
        return None;
    }

    // Cosmetic fields are best-effort: a real booking is not dropped over a
    // missing label or an unrecognized type string.
    let id = str_field(record, &["id", "_id", "lesson_id"])
        .unwrap_or_default()
        .to_string();
    let lesson_type = str_field(record, &["type", "lesson_type", "lessonType"])
        .and_then(LessonType::parse)
        .unwrap_or(LessonType::Private);
    let status = str_field(record, &["status"])
        .and_then(LessonStatus::parse)
        .unwrap_or(LessonStatus::Confirmed);
    let participant_label = str_field(
        record,
        &[
            "participant_label",
            "participantLabel",
            "student_name",
            "studentName",
            "name",
        ],
    )
    .unwrap_or_default()
    .trim()
    .to_string();
    let location = str_field(record, &["location", "court"]).and_then(non_empty);

    Some(Lesson {
        id,
        start,
        end,
        lesson_type,
        status,
        participant_label,
        location,
    })
}

/// Lesson start: `start_date_time` | `startDateTime` | `start`, or a
/// separate `date` + `time` pair.
fn lesson_start(record: &Value) -> Option<NaiveDateTime> {
    if let Some(raw) = str_field(record, &["start_date_time", "startDateTime", "start"]) {
        return parse_local_datetime(raw);
    }
    let date = str_field(record, &["date"]).and_then(parse_date)?;
    let time = str_field(record, &["time", "start_time", "startTime"]).and_then(parse_hhmm)?;
    Some(date.and_time(time))
}

/// Lesson end: an explicit end field wins; otherwise `duration` in half-hour
/// units (so `duration: 3` means 90 minutes), defaulting to 60 minutes.
fn lesson_end(record: &Value, start: NaiveDateTime) -> Option<NaiveDateTime> {
    if let Some(raw) = str_field(record, &["end_date_time", "endDateTime", "end", "endTime"]) {
        if let Some(end) = parse_local_datetime(raw) {
            return Some(end);
        }
        // A bare HH:MM end is on the same day as the start.
        if let Some(time) = parse_hhmm(raw) {
            return Some(start.date().and_time(time));
        }
        // An explicit but unparseable end makes the record malformed.
        return None;
    }
    let halves = duration_halves(record).unwrap_or(2.0);
    let minutes = Duration::try_minutes((halves * 30.0).round() as i64)?;
    start.checked_add_signed(minutes)
}

fn ad_hoc_from_value(record: &Value) -> Option<AdHocSlot> {
    let date = str_field(record, &["date"]).and_then(parse_date)?;
    let start = str_field(record, &["startTime", "start_time", "start"]).and_then(parse_hhmm)?;
    let end = str_field(record, &["endTime", "end_time", "end"]).and_then(parse_hhmm)?;
    if end <= start {
        return None;
    }
    let location = str_field(record, &["location", "court"]).and_then(non_empty);
    let source_id = str_field(record, &["sourceId", "source_id", "id"])
        .unwrap_or_default()
        .to_string();
    Some(AdHocSlot {
        date,
        start,
        end,
        location,
        source_id,
    })
}

fn busy_from_value(record: &Value) -> Option<BusyInterval> {
    let start_node = record.get("start")?;
    let label = str_field(record, &["summary", "title", "label"]).and_then(non_empty);

    // Date-only start marks an all-day entry; the end date is exclusive.
    if let Some(raw) = start_node.get("date").and_then(Value::as_str) {
        let first = parse_date(raw)?;
        let last = record
            .get("end")
            .and_then(|node| node.get("date"))
            .and_then(Value::as_str)
            .and_then(parse_date)
            .filter(|last| *last > first)
            .unwrap_or_else(|| first + Duration::days(1));
        return Some(BusyInterval {
            start: first.and_time(NaiveTime::MIN),
            end: last.and_time(NaiveTime::MIN),
            all_day: true,
            label,
        });
    }

    let start = datetime_node(start_node)?;
    let end = record.get("end").and_then(datetime_node)?;
    if end <= start {
        return None;
    }
    Some(BusyInterval {
        start,
        end,
        all_day: false,
        label,
    })
}

/// A timestamp either under a `dateTime` key (the Google shape) or as a flat
/// string.
fn datetime_node(node: &Value) -> Option<NaiveDateTime> {
    node.get("dateTime")
        .and_then(Value::as_str)
        .or_else(|| node.as_str())
        .and_then(parse_local_datetime)
}

// ---------------------------------------------------------------------------
// Shape helpers
// ---------------------------------------------------------------------------

/// View a payload as a record array: a bare array passes through, an object
/// is probed for the first wrapper key holding an array, anything else is
/// empty.
fn record_array<'a>(payload: &'a Value, wrapper_keys: &[&str]) -> &'a [Value] {
    match payload {
        Value::Array(items) => items,
        Value::Object(map) => wrapper_keys
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// Descend into the first wrapper key holding an object, or stay put.
fn unwrap_object<'a>(payload: &'a Value, wrapper_keys: &[&str]) -> &'a Value {
    wrapper_keys
        .iter()
        .find_map(|key| payload.get(*key).filter(|v| v.is_object()))
        .unwrap_or(payload)
}

/// First string value found under any of the candidate field names.
fn str_field<'a>(record: &'a Value, candidates: &[&str]) -> Option<&'a str> {
    candidates
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
}

/// Duration in half-hour units; tolerates both numeric and numeric-string
/// values.
fn duration_halves(record: &Value) -> Option<f64> {
    for key in ["duration", "duration_slots", "durationSlots"] {
        match record.get(key) {
            Some(Value::Number(n)) => return n.as_f64(),
            Some(Value::String(s)) => return s.trim().parse::<f64>().ok(),
            _ => {}
        }
    }
    None
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Time parsing
// ---------------------------------------------------------------------------

/// Parse a wall-clock timestamp.
///
/// The backend labels local times as UTC (trailing `Z`) and the sync feed
/// sometimes appends a numeric offset; both suffixes are stripped and the
/// remainder is read as local time. No zone conversion — the mislabel is in
/// the data, and converting would shift every lesson by the UTC offset.
fn parse_local_datetime(raw: &str) -> Option<NaiveDateTime> {
    let bare = strip_zone_suffix(raw.trim());
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(bare, format).ok())
}

/// Strip a trailing `Z` or `±HH:MM` from a timestamp string.
fn strip_zone_suffix(raw: &str) -> &str {
    if let Some(bare) = raw.strip_suffix('Z') {
        return bare;
    }
    if raw.len() > 6 && raw.is_char_boundary(raw.len() - 6) {
        let (head, tail) = raw.split_at(raw.len() - 6);
        let bytes = tail.as_bytes();
        let is_offset = (bytes[0] == b'+' || bytes[0] == b'-')
            && bytes[1].is_ascii_digit()
            && bytes[2].is_ascii_digit()
            && bytes[3] == b':'
            && bytes[4].is_ascii_digit()
            && bytes[5].is_ascii_digit();
        // Only after a time component; a plain date has no offset to strip.
        if is_offset && head.contains('T') {
            return head;
        }
    }
    raw
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_local_datetime(trimmed).map(|dt| dt.date()))
}

fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .ok()
        .or_else(|| NaiveTime::parse_from_str(trimmed, "%H:%M:%S").ok())
}

/// Split a `"HH:MM - HH:MM"` slot label, trimming both sides. Labels missing
/// the separator, with unparseable parts, or with `start >= end` are skipped.
fn parse_slot_label(label: &str) -> Option<(NaiveTime, NaiveTime)> {
    let (lhs, rhs) = label.split_once(" - ")?;
    let start = parse_hhmm(lhs)?;
    let end = parse_hhmm(rhs)?;
    (start < end).then_some((start, end))
}

fn parse_weekday(raw: &str) -> Option<Weekday> {
    raw.trim().parse::<Weekday>().ok()
}
