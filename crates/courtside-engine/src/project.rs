//! Weekly rule projection — recurring rules onto concrete visible dates.
//!
//! A [`WeeklyRule`] names a weekday, not a date. For a given visible range
//! (one Sunday-start week for the grid, 1/3/7 days for mobile) each rule is
//! stamped onto every matching date, producing concrete availability windows
//! the subtractor can work on. Ad-hoc slots pass through to the same window
//! shape unchanged.

use chrono::Datelike;

use crate::types::{AdHocSlot, AvailWindow, DateSpan, WeeklyRule, WindowOrigin};

/// Project recurring weekly rules onto every matching date in the range.
///
/// A rule whose weekday does not occur in the range yields nothing; the rule
/// set itself is never mutated. Output is ordered by (date, start).
pub fn project_weekly(rules: &[WeeklyRule], range: DateSpan) -> Vec<AvailWindow> {
    let mut windows = Vec::new();
    for date in range.dates() {
        for rule in rules {
            if rule.weekday == date.weekday() {
                windows.push(AvailWindow {
                    date,
                    start: rule.start,
                    end: rule.end,
                    location: rule.location.clone(),
                    origin: WindowOrigin::Weekly,
                });
            }
        }
    }
    windows.sort_by_key(|window| (window.date, window.start, window.end));
    windows
}

/// Pass ad-hoc slots inside the range through as availability windows.
pub fn ad_hoc_windows(slots: &[AdHocSlot], range: DateSpan) -> Vec<AvailWindow> {
    let mut windows: Vec<AvailWindow> = slots
        .iter()
        .filter(|slot| range.contains(slot.date))
        .map(|slot| AvailWindow {
            date: slot.date,
            start: slot.start,
            end: slot.end,
            location: slot.location.clone(),
            origin: WindowOrigin::AdHoc {
                source_id: slot.source_id.clone(),
            },
        })
        .collect();
    windows.sort_by_key(|window| (window.date, window.start, window.end));
    windows
}

/// All availability windows for the range: projected weekly rules plus
/// ad-hoc pass-throughs, in one (date, start)-ordered list.
pub fn availability_windows(
    rules: &[WeeklyRule],
    slots: &[AdHocSlot],
    range: DateSpan,
) -> Vec<AvailWindow> {
    let mut windows = project_weekly(rules, range);
    windows.extend(ad_hoc_windows(slots, range));
    windows.sort_by_key(|window| (window.date, window.start, window.end));
    windows
}
