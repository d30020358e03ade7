//! Error types for schedule state operations.
//!
//! Very little in this engine is an error: malformed records are dropped
//! during normalization, fetch failures become source status flags with the
//! stale data retained, and failed mutations are recovered by reverting the
//! optimistic local change. What remains is the caller handing us an id we
//! have never seen.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    /// A lesson patch referenced an id that is not in the local list.
    #[error("unknown lesson: {0}")]
    UnknownLesson(String),
}

/// Convenience alias used throughout courtside-engine.
pub type Result<T> = std::result::Result<T, ScheduleError>;
