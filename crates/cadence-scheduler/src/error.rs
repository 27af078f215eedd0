use thiserror::Error;

use crate::types::RunStatus;

/// A schedule definition that cannot be accepted.
///
/// Closed set: every rejection reason the validator can produce. These are
/// surfaced synchronously from create/update and never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Owner id is required")]
    MissingOwner,

    #[error("Schedule id is required")]
    MissingId,

    #[error("Report type is required")]
    MissingReportType,

    #[error("Agent alias is required")]
    MissingAgentAlias,

    #[error("Unsupported frequency: {0}")]
    UnsupportedFrequency(String),

    #[error("Weekday is required for weekly schedules")]
    MissingWeekday,

    #[error("Invalid weekday: {0}")]
    InvalidWeekday(String),

    #[error("Time of day is required")]
    MissingTimeOfDay,

    #[error("Invalid time of day (expected HH:MM): {0}")]
    InvalidTimeOfDay(String),

    #[error("Recurrence rule is required for custom schedules")]
    MissingRrule,
}

/// Errors that can occur within the scheduling engine.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The schedule definition failed validation.
    #[error("Invalid schedule: {0}")]
    Validation(#[from] ValidationError),

    /// No schedule with the given id exists for the owner.
    #[error("Schedule not found: {id}")]
    ScheduleNotFound { id: String },

    /// No execution run with the given id exists for the owner.
    #[error("Execution run not found: {id}")]
    RunNotFound { id: String },

    /// The next trigger instant could not be computed (bad rrule, or the
    /// rule has no occurrence after the reference instant).
    #[error("Unable to compute next run: {0}")]
    NextRunUnavailable(String),

    /// Execute was called without a configured report pipeline.
    #[error("Dispatch collaborator not configured")]
    DispatcherNotConfigured,

    /// Generation or dispatch failed during an attempt. Recorded on the
    /// ExecutionRun; the schedule stays due and is retried on the next sweep.
    #[error("Report attempt failed: {0}")]
    AttemptFailed(String),

    /// An ExecutionRun was asked to move backwards or out of a terminal state.
    #[error("Invalid run transition: {from} -> {to}")]
    InvalidRunTransition { from: RunStatus, to: RunStatus },

    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Channels set or run metadata failed to (de)serialize.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
