//! Engine error taxonomy.
//!
//! Everything here is an invalid-argument rejection: the engine has no I/O,
//! so a call either yields a valid Task or one of these.

use chrono::NaiveDate;
use thiserror::Error;

use crate::update::EditMode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("edit mode `{mode}` requires an instance date")]
    MissingInstanceDate { mode: EditMode },

    #[error("task {task_id} is not recurring")]
    NotRecurring { task_id: String },

    #[error("task {task_id} has no occurrence on {date}")]
    NotAnOccurrence { task_id: String, date: NaiveDate },

    #[error("custom cadence interval must be positive, got {interval}")]
    InvalidInterval { interval: i64 },

    #[error("weekly cadence needs at least one weekday")]
    EmptyWeekdays,

    #[error("custom cadence needs a start date to anchor its interval")]
    MissingStartDate,

    #[error("cadence ends ({end}) before it starts ({start})")]
    InvertedBounds { start: NaiveDate, end: NaiveDate },

    #[error("window start {start} is after window end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("window must span at least one day")]
    EmptyWindow,

    #[error("weight must be a positive integer")]
    InvalidWeight,

    #[error("invalid date '{input}' (expected YYYY-MM-DD)")]
    InvalidDate { input: String },

    #[error("task not found: {task_id}")]
    TaskNotFound { task_id: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
