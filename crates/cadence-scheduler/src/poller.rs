use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{error, info};

use crate::orchestrator::ScheduleOrchestrator;
use crate::store::{RunStore, ScheduleStore};

/// Single-instance sweep loop: every tick, fetch due schedules and execute
/// them one at a time.
///
/// The engine carries no distributed lease — running two pollers against the
/// same store can double-dispatch the same occurrence. Deployments that need
/// more than one instance must add an external claim step first.
pub struct SchedulePoller<S: ScheduleStore + RunStore> {
    orchestrator: Arc<ScheduleOrchestrator<S>>,
    poll_interval: std::time::Duration,
}

impl<S: ScheduleStore + RunStore> SchedulePoller<S> {
    pub fn new(
        orchestrator: Arc<ScheduleOrchestrator<S>>,
        poll_interval: std::time::Duration,
    ) -> Self {
        Self {
            orchestrator,
            poll_interval,
        }
    }

    /// Main loop. Sweeps until `shutdown` broadcasts `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval = ?self.poll_interval, "schedule poller started");

        let mut interval = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.sweep().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("schedule poller shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// One pass over the due set. Attempt failures are already recorded on
    /// their runs, so here they are logged and the loop moves on; the failed
    /// schedule stays due and the next sweep retries it.
    async fn sweep(&self) {
        let due = match self.orchestrator.list_due(Utc::now()) {
            Ok(due) => due,
            Err(e) => {
                error!("due-schedule sweep failed: {e}");
                return;
            }
        };
        for schedule in due {
            if let Err(e) = self.orchestrator.execute(&schedule).await {
                error!(schedule_id = %schedule.id, "schedule execution failed: {e}");
            }
        }
    }
}
