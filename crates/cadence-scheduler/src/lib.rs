//! `cadence-scheduler` — recurring-report scheduling engine with SQLite
//! persistence.
//!
//! # Overview
//!
//! Schedules are persisted to a SQLite `schedules` table with a precomputed
//! `next_run` instant. The [`poller::SchedulePoller`] sweeps for due
//! schedules and drives one dispatch attempt each through the
//! [`orchestrator::ScheduleOrchestrator`], which records every attempt as an
//! [`ExecutionRun`] row and advances `next_run` only after a fully
//! successful attempt.
//!
//! # Frequency variants
//!
//! | Variant  | Behaviour                                                |
//! |----------|----------------------------------------------------------|
//! | `Daily`  | Fire at HH:MM every day in the schedule's zone           |
//! | `Weekly` | Fire at HH:MM on a specific weekday                      |
//! | `Custom` | Fire per an RFC-5545 recurrence rule                     |
//!
//! All persisted instants are UTC regardless of the schedule's zone.

pub mod db;
pub mod error;
pub mod orchestrator;
pub mod poller;
pub mod recurrence;
pub mod store;
pub mod types;

pub use error::{Result, SchedulerError, ValidationError};
pub use orchestrator::ScheduleOrchestrator;
pub use poller::SchedulePoller;
pub use recurrence::compute_next_run;
pub use store::{RunStore, ScheduleStore, SqliteStore};
pub use types::{
    ExecutionRun, Frequency, RunFilter, RunStatus, Schedule, ScheduleDraft, ScheduleUpdate,
};
