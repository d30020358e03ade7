//! # courtside-engine
//!
//! Availability reconciliation for the courtside coaching calendar.
//!
//! The engine turns three independently fetched backend lists (booked
//! lessons, coach availability, external busy time) into one coherent
//! bookable surface: normalized records in, an ordered per-day event index
//! out, plus slot resolution for taps and grid/agenda projections for
//! rendering. All times are wall-clock values in the coach's single local
//! time zone; the engine never converts zones.
//!
//! ## Modules
//!
//! - [`normalize`] — heterogeneous backend payloads → canonical records
//! - [`project`] — weekly rules and ad-hoc slots → dated windows
//! - [`subtract`] — availability windows minus busy time
//! - [`reconcile`] — merged, ordered calendar surface with per-day buckets
//! - [`resolve`] — what a tap on one half-hour cell means
//! - [`view`] — week grid and mobile agenda projections
//! - [`state`] — session state, fetch racing, optimistic edits
//! - [`error`] — error types
//! - [`types`] — canonical record types

pub mod error;
pub mod normalize;
pub mod project;
pub mod reconcile;
pub mod resolve;
pub mod state;
pub mod subtract;
pub mod types;
pub mod view;

pub use error::ScheduleError;
pub use normalize::{normalize_availability, normalize_busy, normalize_lessons, AvailabilityData};
pub use project::{ad_hoc_windows, availability_windows, project_weekly};
pub use reconcile::{reconcile, Reconciled, ScheduleSources};
pub use resolve::{resolve_slot, Resolution};
pub use state::{
    FetchOutcome, FetchTicket, LessonPatch, PendingCreate, PendingUpdate, ScheduleState,
    SourceKind, SourceStatus,
};
pub use subtract::subtract_busy;
pub use types::{
    AdHocSlot, BusyInterval, CalendarEvent, DateSpan, EventKind, FreeSegment, Lesson,
    LessonStatus, LessonType, WeeklyRule,
};
pub use view::{MobileSpan, MobileView, WeekGrid};
