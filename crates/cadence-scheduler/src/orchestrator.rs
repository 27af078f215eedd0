use std::future::Future;
use std::sync::Arc;

use cadence_core::{CoreError, Reporting};
use chrono::{DateTime, Duration, Utc};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{Result, SchedulerError};
use crate::recurrence::compute_next_run;
use crate::store::{RunStore, ScheduleStore};
use crate::types::{ExecutionRun, RunFilter, Schedule, ScheduleDraft, ScheduleUpdate};

/// Façade over the schedule store, the recurrence calculator and the report
/// pipeline. Every mutation of a schedule or run row goes through here.
pub struct ScheduleOrchestrator<S: ScheduleStore + RunStore> {
    store: Arc<S>,
    reporting: Reporting,
    /// Upper bound on a single generation or dispatch call; an elapsed
    /// timeout counts as a failed attempt.
    dispatch_timeout: std::time::Duration,
}

impl<S: ScheduleStore + RunStore> ScheduleOrchestrator<S> {
    pub fn new(store: Arc<S>, reporting: Reporting, dispatch_timeout: std::time::Duration) -> Self {
        Self {
            store,
            reporting,
            dispatch_timeout,
        }
    }

    /// Validate a draft, compute its first trigger instant and persist it.
    #[instrument(skip(self, draft), fields(owner_id = %draft.owner_id))]
    pub fn create(&self, draft: ScheduleDraft) -> Result<Schedule> {
        let mut schedule = Schedule::new(draft);
        schedule.validate()?;
        schedule.next_run = compute_next_run(&schedule, Utc::now())?;
        self.store.insert_schedule(&schedule)?;
        info!(schedule_id = %schedule.id, next_run = %schedule.next_run, "schedule created");
        Ok(schedule)
    }

    /// Merge the provided fields, re-validate, and recompute `next_run` from
    /// "now" — even when only unrelated fields changed, so the trigger is a
    /// pure function of the current recurrence fields.
    #[instrument(skip(self, update), fields(schedule_id = %id))]
    pub fn update(&self, owner_id: Uuid, id: Uuid, update: ScheduleUpdate) -> Result<Schedule> {
        let mut schedule = self
            .store
            .get_schedule(owner_id, id)?
            .ok_or_else(|| SchedulerError::ScheduleNotFound { id: id.to_string() })?;
        update.apply_to(&mut schedule);
        schedule.validate()?;
        schedule.next_run = compute_next_run(&schedule, Utc::now())?;
        schedule.updated_at = Utc::now();
        self.store.update_schedule(&schedule)?;
        Ok(schedule)
    }

    /// Delete a schedule and its entire run history. History is not retained
    /// past schedule deletion.
    #[instrument(skip(self), fields(schedule_id = %id))]
    pub fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        if self.store.get_schedule(owner_id, id)?.is_none() {
            return Err(SchedulerError::ScheduleNotFound { id: id.to_string() });
        }
        let removed = self.store.delete_runs_for_schedule(owner_id, id)?;
        self.store.delete_schedule(owner_id, id)?;
        info!(schedule_id = %id, runs_removed = removed, "schedule deleted");
        Ok(())
    }

    /// All of an owner's schedules, soonest-due first.
    pub fn list(&self, owner_id: Uuid) -> Result<Vec<Schedule>> {
        self.store.list_for_owner(owner_id)
    }

    /// The poller's entry point: every active, unpaused schedule across all
    /// owners whose `next_run` has elapsed.
    pub fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<Schedule>> {
        self.store.list_due(now)
    }

    pub fn set_active_bulk(&self, owner_id: Uuid, ids: &[Uuid], active: bool) -> Result<usize> {
        self.store.set_active_bulk(owner_id, ids, active)
    }

    pub fn set_paused_bulk(&self, owner_id: Uuid, ids: &[Uuid], paused: bool) -> Result<usize> {
        self.store.set_paused_bulk(owner_id, ids, paused)
    }

    /// Run history for an owner, newest first.
    pub fn list_runs(&self, owner_id: Uuid, filter: &RunFilter) -> Result<Vec<ExecutionRun>> {
        self.store.list_runs(owner_id, filter)
    }

    /// Fire one dispatch attempt for `schedule`.
    ///
    /// Disabled (inactive or paused) schedules are skipped without recording
    /// anything. A generation or dispatch failure is recorded on the run and
    /// leaves `next_run` untouched, so the schedule stays due and the next
    /// sweep retries it. Only a fully successful attempt advances the
    /// schedule to its next occurrence.
    #[instrument(skip(self, schedule), fields(schedule_id = %schedule.id))]
    pub async fn execute(&self, schedule: &Schedule) -> Result<Option<ExecutionRun>> {
        if !schedule.active || schedule.paused {
            debug!("skipping disabled schedule");
            return Ok(None);
        }
        let (generator, dispatcher) = match &self.reporting {
            Reporting::Configured {
                generator,
                dispatcher,
            } => (Arc::clone(generator), Arc::clone(dispatcher)),
            // Precondition failure: no run row is recorded for this.
            Reporting::Absent => return Err(SchedulerError::DispatcherNotConfigured),
        };

        let mut run = ExecutionRun::new(schedule.id, schedule.owner_id);
        self.store.insert_run(&run)?;
        run.start(Utc::now())?;
        self.store.update_run(&run)?;

        let summary = match self.bounded(generator.generate(schedule.owner_id)).await {
            Ok(summary) => summary,
            Err(message) => return self.record_failure(run, &message),
        };

        let opts = schedule.dispatch_options();
        if let Err(message) = self.bounded(dispatcher.dispatch(&summary, &opts)).await {
            return self.record_failure(run, &message);
        }

        let now = Utc::now();
        run.complete(format!("{} report dispatched", schedule.report_type), now)?;
        self.store.update_run(&run)?;

        // Small forward offset so the fresh occurrence can never be the
        // instant that just fired.
        let next = compute_next_run(schedule, now + Duration::minutes(1))?;
        let mut advanced = schedule.clone();
        advanced.mark_executed(next, now);
        self.store.update_schedule(&advanced)?;
        info!(next_run = %next, "report dispatched");
        Ok(Some(run))
    }

    /// Run a collaborator call under the configured timeout. Both a returned
    /// error and an elapsed timeout become attempt-failure messages.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = std::result::Result<T, CoreError>>,
    ) -> std::result::Result<T, String> {
        match timeout(self.dispatch_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "collaborator call timed out after {:?}",
                self.dispatch_timeout
            )),
        }
    }

    fn record_failure(
        &self,
        mut run: ExecutionRun,
        message: &str,
    ) -> Result<Option<ExecutionRun>> {
        run.fail(message, Utc::now())?;
        self.store.update_run(&run)?;
        warn!(run_id = %run.id, %message, "report attempt failed; schedule stays due");
        Err(SchedulerError::AttemptFailed(message.to_string()))
    }
}
