//! Session state — the source lists, their fetch lifecycle, and optimistic
//! edits.
//!
//! One [`ScheduleState`] lives for a signed-in coach session. Fetches are
//! raced deliberately: every refresh gets a monotonically numbered ticket
//! per source, and only the newest ticket's response is applied, so a slow
//! early response can never clobber a later one. Edits apply optimistically
//! and hand back a guard holding the pre-edit list; the host confirms the
//! guard with the server's row or reverts it on failure.

use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use crate::error::{Result, ScheduleError};
use crate::normalize::{normalize_availability, normalize_busy, normalize_lessons};
use crate::reconcile::{reconcile, Reconciled, ScheduleSources};
use crate::resolve::{self, Resolution};
use crate::types::{
    AdHocSlot, BusyInterval, DateSpan, Lesson, LessonStatus, LessonType, WeeklyRule,
};

/// Which remote list a fetch refreshes. The availability payload carries
/// weekly rules and ad-hoc slots together, so they share one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Lessons,
    Availability,
    Busy,
}

/// Lifecycle of one source list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceStatus {
    /// Never fetched.
    #[default]
    Pending,
    Loading,
    Ready,
    /// Last fetch failed; the previously loaded data stays on screen.
    Failed(String),
}

/// Handle for one in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    source: SourceKind,
    serial: u64,
}

/// Whether a completed fetch was acted on or discarded as superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Stale,
}

/// Guard for an optimistic ad-hoc slot create, holding the pre-edit list.
#[derive(Debug, Clone)]
pub struct PendingCreate {
    key: (NaiveDate, NaiveTime),
    snapshot: Vec<AdHocSlot>,
}

/// Guard for an optimistic lesson update, holding the pre-edit list.
#[derive(Debug, Clone)]
pub struct PendingUpdate {
    id: String,
    snapshot: Vec<Lesson>,
}

/// Fields of a lesson edit; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonPatch {
    pub start: Option<chrono::NaiveDateTime>,
    pub end: Option<chrono::NaiveDateTime>,
    pub status: Option<LessonStatus>,
    pub lesson_type: Option<LessonType>,
    pub location: Option<String>,
    pub participant_label: Option<String>,
}

impl LessonPatch {
    fn apply(self, lesson: &mut Lesson) {
        if let Some(start) = self.start {
            lesson.start = start;
        }
        if let Some(end) = self.end {
            lesson.end = end;
        }
        if let Some(status) = self.status {
            lesson.status = status;
        }
        if let Some(lesson_type) = self.lesson_type {
            lesson.lesson_type = lesson_type;
        }
        if let Some(location) = self.location {
            lesson.location = Some(location);
        }
        if let Some(label) = self.participant_label {
            lesson.participant_label = label;
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SourceTracker {
    status: SourceStatus,
    issued: u64,
}

#[derive(Debug, Clone)]
struct CachedReconcile {
    revision: u64,
    range: DateSpan,
    surface: Reconciled,
}

/// The live schedule for one coach session.
#[derive(Debug, Clone, Default)]
pub struct ScheduleState {
    lessons: Vec<Lesson>,
    weekly_rules: Vec<WeeklyRule>,
    ad_hoc: Vec<AdHocSlot>,
    busy: Vec<BusyInterval>,
    /// Court names in display order; the first is the booking default.
    courts: Vec<String>,
    lessons_fetch: SourceTracker,
    availability_fetch: SourceTracker,
    busy_fetch: SourceTracker,
    /// Bumped on every data change; guards the reconcile cache.
    revision: u64,
    cache: Option<CachedReconcile>,
}

impl ScheduleState {
    pub fn new(courts: Vec<String>) -> ScheduleState {
        ScheduleState {
            courts,
            ..ScheduleState::default()
        }
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn lesson(&self, id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.id == id)
    }

    pub fn weekly_rules(&self) -> &[WeeklyRule] {
        &self.weekly_rules
    }

    pub fn ad_hoc_slots(&self) -> &[AdHocSlot] {
        &self.ad_hoc
    }

    pub fn busy(&self) -> &[BusyInterval] {
        &self.busy
    }

    pub fn courts(&self) -> &[String] {
        &self.courts
    }

    pub fn set_courts(&mut self, courts: Vec<String>) {
        self.courts = courts;
        self.touch();
    }

    /// Current data revision. Bumps whenever a fetch lands or an edit is
    /// staged, confirmed, or reverted.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn source_status(&self, source: SourceKind) -> &SourceStatus {
        &self.tracker(source).status
    }

    /// Borrowed view of the raw lists, for direct reconciliation.
    pub fn sources(&self) -> ScheduleSources<'_> {
        ScheduleSources {
            lessons: &self.lessons,
            weekly_rules: &self.weekly_rules,
            ad_hoc: &self.ad_hoc,
            busy: &self.busy,
        }
    }

    // -----------------------------------------------------------------------
    // Fetch lifecycle
    // -----------------------------------------------------------------------

    /// Start a refresh of `source`. The returned ticket supersedes every
    /// ticket issued earlier for the same source.
    pub fn begin_fetch(&mut self, source: SourceKind) -> FetchTicket {
        let tracker = self.tracker_mut(source);
        tracker.issued += 1;
        tracker.status = SourceStatus::Loading;
        FetchTicket {
            source,
            serial: tracker.issued,
        }
    }

    /// Land a fetch response. A ticket that is no longer the newest for its
    /// source is discarded whole, success or failure alike. A failed newest
    /// fetch records the error but keeps the previous data on screen.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        payload: std::result::Result<&Value, String>,
    ) -> FetchOutcome {
        if ticket.serial != self.tracker(ticket.source).issued {
            return FetchOutcome::Stale;
        }
        match payload {
            Ok(value) => {
                match ticket.source {
                    SourceKind::Lessons => self.lessons = normalize_lessons(value),
                    SourceKind::Availability => {
                        let data = normalize_availability(value);
                        self.weekly_rules = data.weekly;
                        self.ad_hoc = data.ad_hoc;
                    }
                    SourceKind::Busy => self.busy = normalize_busy(value),
                }
                self.tracker_mut(ticket.source).status = SourceStatus::Ready;
                self.touch();
            }
            Err(message) => {
                self.tracker_mut(ticket.source).status = SourceStatus::Failed(message);
            }
        }
        FetchOutcome::Applied
    }

    // -----------------------------------------------------------------------
    // Reconciled views
    // -----------------------------------------------------------------------

    /// The reconciled surface for `range`, recomputed only when the range
    /// or the data revision changed since the last call.
    pub fn reconciled(&mut self, range: DateSpan) -> &Reconciled {
        let cached = match self.cache.take() {
            Some(cached) if cached.revision == self.revision && cached.range == range => cached,
            _ => CachedReconcile {
                revision: self.revision,
                range,
                surface: reconcile(self.sources(), range),
            },
        };
        &self.cache.insert(cached).surface
    }

    /// Resolve a tapped cell. Reuses the cached surface when it covers the
    /// date, otherwise reconciles just that day.
    pub fn resolve_slot(&mut self, date: NaiveDate, time: NaiveTime) -> Option<Resolution> {
        let range = match &self.cache {
            Some(cached) if cached.revision == self.revision && cached.range.contains(date) => {
                cached.range
            }
            _ => DateSpan::single(date),
        };
        let day = self.reconciled(range).day(date).to_vec();
        resolve::resolve_slot(&day, &self.ad_hoc, &self.courts, date, time)
    }

    // -----------------------------------------------------------------------
    // Optimistic edits
    // -----------------------------------------------------------------------

    /// Insert (or replace, keyed by date and start) an ad-hoc slot before
    /// the server has acknowledged it.
    pub fn stage_ad_hoc_slot(&mut self, slot: AdHocSlot) -> PendingCreate {
        let snapshot = self.ad_hoc.clone();
        let key = (slot.date, slot.start);
        self.upsert_ad_hoc(slot);
        self.touch();
        PendingCreate { key, snapshot }
    }

    /// Replace the optimistic slot with the server's confirmed row.
    pub fn confirm_ad_hoc_slot(&mut self, pending: PendingCreate, confirmed: AdHocSlot) {
        self.ad_hoc
            .retain(|slot| (slot.date, slot.start) != pending.key);
        self.upsert_ad_hoc(confirmed);
        self.touch();
    }

    /// Restore the slot list captured when the create was staged.
    pub fn revert_ad_hoc_slot(&mut self, pending: PendingCreate) {
        self.ad_hoc = pending.snapshot;
        self.touch();
    }

    /// Apply a lesson edit optimistically. Fails without touching anything
    /// when the id is not in the local list.
    pub fn stage_lesson_update(&mut self, id: &str, patch: LessonPatch) -> Result<PendingUpdate> {
        let snapshot = self.lessons.clone();
        let lesson = self
            .lessons
            .iter_mut()
            .find(|lesson| lesson.id == id)
            .ok_or_else(|| ScheduleError::UnknownLesson(id.to_string()))?;
        patch.apply(lesson);
        self.touch();
        Ok(PendingUpdate {
            id: id.to_string(),
            snapshot,
        })
    }

    /// Cancel a lesson in place. Cancelled lessons stay in the list and on
    /// the calendar; only their status changes.
    pub fn stage_lesson_cancel(&mut self, id: &str) -> Result<PendingUpdate> {
        self.stage_lesson_update(
            id,
            LessonPatch {
                status: Some(LessonStatus::Cancelled),
                ..LessonPatch::default()
            },
        )
    }

    /// Replace the optimistic lesson with the server's confirmed row.
    pub fn confirm_lesson_update(&mut self, pending: PendingUpdate, confirmed: Lesson) {
        match self
            .lessons
            .iter_mut()
            .find(|lesson| lesson.id == pending.id)
        {
            Some(existing) => *existing = confirmed,
            None => self.lessons.push(confirmed),
        }
        self.touch();
    }

    /// Restore the lesson list captured when the update was staged.
    pub fn revert_lesson_update(&mut self, pending: PendingUpdate) {
        self.lessons = pending.snapshot;
        self.touch();
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn upsert_ad_hoc(&mut self, slot: AdHocSlot) {
        match self
            .ad_hoc
            .iter_mut()
            .find(|existing| existing.date == slot.date && existing.start == slot.start)
        {
            Some(existing) => *existing = slot,
            None => self.ad_hoc.push(slot),
        }
    }

    fn tracker(&self, source: SourceKind) -> &SourceTracker {
        match source {
            SourceKind::Lessons => &self.lessons_fetch,
            SourceKind::Availability => &self.availability_fetch,
            SourceKind::Busy => &self.busy_fetch,
        }
    }

    fn tracker_mut(&mut self, source: SourceKind) -> &mut SourceTracker {
        match source {
            SourceKind::Lessons => &mut self.lessons_fetch,
            SourceKind::Availability => &mut self.availability_fetch,
            SourceKind::Busy => &mut self.busy_fetch,
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}
