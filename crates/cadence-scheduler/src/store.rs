use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, ToSql};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::db::init_db;
use crate::error::{Result, SchedulerError};
use crate::types::{ExecutionRun, RunFilter, Schedule};

/// Page size for run-history listings when the caller does not set one.
const DEFAULT_RUN_LIMIT: usize = 50;

/// Persistence contract for schedules.
///
/// The orchestrator only ever talks to this trait (and [`RunStore`]), so the
/// engine can be tested against any backing store.
pub trait ScheduleStore: Send + Sync {
    fn insert_schedule(&self, schedule: &Schedule) -> Result<()>;
    /// Persist every mutable field. Returns `ScheduleNotFound` when the
    /// (id, owner) pair does not resolve.
    fn update_schedule(&self, schedule: &Schedule) -> Result<()>;
    fn get_schedule(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Schedule>>;
    fn delete_schedule(&self, owner_id: Uuid, id: Uuid) -> Result<()>;
    /// All schedules for one owner, soonest-due first.
    fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Schedule>>;
    /// System-wide sweep: active, unpaused schedules due at or before `now`.
    fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<Schedule>>;
    /// Batched flag update for an owner's id set. Deactivation force-clears
    /// `paused`. Returns the number of rows touched.
    fn set_active_bulk(&self, owner_id: Uuid, ids: &[Uuid], active: bool) -> Result<usize>;
    fn set_paused_bulk(&self, owner_id: Uuid, ids: &[Uuid], paused: bool) -> Result<usize>;
}

/// Persistence contract for execution runs.
pub trait RunStore: Send + Sync {
    fn insert_run(&self, run: &ExecutionRun) -> Result<()>;
    fn update_run(&self, run: &ExecutionRun) -> Result<()>;
    /// Cascade step for schedule deletion. Returns the number of rows removed.
    fn delete_runs_for_schedule(&self, owner_id: Uuid, schedule_id: Uuid) -> Result<usize>;
    /// Run history for an owner, newest first, filtered and paginated.
    fn list_runs(&self, owner_id: Uuid, filter: &RunFilter) -> Result<Vec<ExecutionRun>>;
}

/// SQLite-backed store.
///
/// Wraps a single connection in a `Mutex`. Sufficient for the single-poller
/// deployment this engine targets; a pool would only matter with many
/// concurrent API callers.
pub struct SqliteStore {
    db: Mutex<Connection>,
}

impl SqliteStore {
    /// Wrap a connection, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }
}

impl ScheduleStore for SqliteStore {
    #[instrument(skip(self, schedule), fields(schedule_id = %schedule.id))]
    fn insert_schedule(&self, schedule: &Schedule) -> Result<()> {
        let channels = serde_json::to_string(&schedule.channels)?;
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO schedules
             (id, owner_id, report_type, agent_alias, frequency, weekday,
              time_of_day, timezone, rrule, priority, email, phone_number,
              channels, active, paused, next_run, last_run, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19)",
            rusqlite::params![
                schedule.id.to_string(),
                schedule.owner_id.to_string(),
                schedule.report_type,
                schedule.agent_alias,
                schedule.frequency.to_string(),
                schedule.weekday,
                schedule.time_of_day,
                schedule.timezone,
                schedule.rrule,
                schedule.priority,
                schedule.email,
                schedule.phone_number,
                channels,
                schedule.active,
                schedule.paused,
                encode_ts(schedule.next_run),
                schedule.last_run.map(encode_ts),
                encode_ts(schedule.created_at),
                encode_ts(schedule.updated_at),
            ],
        )?;
        debug!("schedule inserted");
        Ok(())
    }

    #[instrument(skip(self, schedule), fields(schedule_id = %schedule.id))]
    fn update_schedule(&self, schedule: &Schedule) -> Result<()> {
        let channels = serde_json::to_string(&schedule.channels)?;
        let db = self.db.lock().unwrap();
        let rows_changed = db.execute(
            "UPDATE schedules SET
                report_type = ?1, agent_alias = ?2, frequency = ?3, weekday = ?4,
                time_of_day = ?5, timezone = ?6, rrule = ?7, priority = ?8,
                email = ?9, phone_number = ?10, channels = ?11, active = ?12,
                paused = ?13, next_run = ?14, last_run = ?15, updated_at = ?16
             WHERE id = ?17 AND owner_id = ?18",
            rusqlite::params![
                schedule.report_type,
                schedule.agent_alias,
                schedule.frequency.to_string(),
                schedule.weekday,
                schedule.time_of_day,
                schedule.timezone,
                schedule.rrule,
                schedule.priority,
                schedule.email,
                schedule.phone_number,
                channels,
                schedule.active,
                schedule.paused,
                encode_ts(schedule.next_run),
                schedule.last_run.map(encode_ts),
                encode_ts(schedule.updated_at),
                schedule.id.to_string(),
                schedule.owner_id.to_string(),
            ],
        )?;
        if rows_changed == 0 {
            return Err(SchedulerError::ScheduleNotFound {
                id: schedule.id.to_string(),
            });
        }
        Ok(())
    }

    #[instrument(skip(self), fields(schedule_id = %id))]
    fn get_schedule(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Schedule>> {
        let db = self.db.lock().unwrap();
        match db.query_row(
            &format!("SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE id = ?1 AND owner_id = ?2"),
            rusqlite::params![id.to_string(), owner_id.to_string()],
            row_to_schedule,
        ) {
            Ok(s) => Ok(Some(s)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(SchedulerError::Database(e)),
        }
    }

    #[instrument(skip(self), fields(schedule_id = %id))]
    fn delete_schedule(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let db = self.db.lock().unwrap();
        let rows_changed = db.execute(
            "DELETE FROM schedules WHERE id = ?1 AND owner_id = ?2",
            rusqlite::params![id.to_string(), owner_id.to_string()],
        )?;
        if rows_changed == 0 {
            return Err(SchedulerError::ScheduleNotFound { id: id.to_string() });
        }
        Ok(())
    }

    fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Schedule>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules
             WHERE owner_id = ?1 ORDER BY next_run ASC"
        ))?;
        let rows = stmt.query_map(rusqlite::params![owner_id.to_string()], row_to_schedule)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<Schedule>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules
             WHERE active = 1 AND paused = 0 AND next_run <= ?1
             ORDER BY next_run ASC"
        ))?;
        let rows = stmt.query_map(rusqlite::params![encode_ts(now)], row_to_schedule)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    #[instrument(skip(self, ids), fields(count = ids.len(), active))]
    fn set_active_bulk(&self, owner_id: Uuid, ids: &[Uuid], active: bool) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; ids.len()].join(",");
        // Deactivation force-clears paused: "paused" is only meaningful for
        // an active schedule. next_run is deliberately untouched.
        let sql = if active {
            format!(
                "UPDATE schedules SET active = 1, updated_at = ?
                 WHERE owner_id = ? AND id IN ({placeholders})"
            )
        } else {
            format!(
                "UPDATE schedules SET active = 0, paused = 0, updated_at = ?
                 WHERE owner_id = ? AND id IN ({placeholders})"
            )
        };
        let mut values: Vec<String> = vec![encode_ts(Utc::now()), owner_id.to_string()];
        values.extend(ids.iter().map(Uuid::to_string));

        let db = self.db.lock().unwrap();
        let rows_changed = db.execute(&sql, rusqlite::params_from_iter(values.iter()))?;
        Ok(rows_changed)
    }

    #[instrument(skip(self, ids), fields(count = ids.len(), paused))]
    fn set_paused_bulk(&self, owner_id: Uuid, ids: &[Uuid], paused: bool) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!(
            "UPDATE schedules SET paused = {}, updated_at = ?
             WHERE owner_id = ? AND id IN ({placeholders})",
            i64::from(paused)
        );
        let mut values: Vec<String> = vec![encode_ts(Utc::now()), owner_id.to_string()];
        values.extend(ids.iter().map(Uuid::to_string));

        let db = self.db.lock().unwrap();
        let rows_changed = db.execute(&sql, rusqlite::params_from_iter(values.iter()))?;
        Ok(rows_changed)
    }
}

impl RunStore for SqliteStore {
    #[instrument(skip(self, run), fields(run_id = %run.id))]
    fn insert_run(&self, run: &ExecutionRun) -> Result<()> {
        let metadata = serde_json::to_string(&run.metadata)?;
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO execution_runs
             (id, owner_id, schedule_id, status, output, error_message,
              metadata, started_at, completed_at, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
            rusqlite::params![
                run.id.to_string(),
                run.owner_id.to_string(),
                run.schedule_id.to_string(),
                run.status.to_string(),
                run.output,
                run.error_message,
                metadata,
                run.started_at.map(encode_ts),
                run.completed_at.map(encode_ts),
                encode_ts(run.created_at),
                encode_ts(run.updated_at),
            ],
        )?;
        Ok(())
    }

    #[instrument(skip(self, run), fields(run_id = %run.id, status = %run.status))]
    fn update_run(&self, run: &ExecutionRun) -> Result<()> {
        let metadata = serde_json::to_string(&run.metadata)?;
        let db = self.db.lock().unwrap();
        let rows_changed = db.execute(
            "UPDATE execution_runs SET
                status = ?1, output = ?2, error_message = ?3, metadata = ?4,
                started_at = ?5, completed_at = ?6, updated_at = ?7
             WHERE id = ?8 AND owner_id = ?9",
            rusqlite::params![
                run.status.to_string(),
                run.output,
                run.error_message,
                metadata,
                run.started_at.map(encode_ts),
                run.completed_at.map(encode_ts),
                encode_ts(run.updated_at),
                run.id.to_string(),
                run.owner_id.to_string(),
            ],
        )?;
        if rows_changed == 0 {
            return Err(SchedulerError::RunNotFound {
                id: run.id.to_string(),
            });
        }
        Ok(())
    }

    #[instrument(skip(self), fields(schedule_id = %schedule_id))]
    fn delete_runs_for_schedule(&self, owner_id: Uuid, schedule_id: Uuid) -> Result<usize> {
        let db = self.db.lock().unwrap();
        let rows_changed = db.execute(
            "DELETE FROM execution_runs WHERE owner_id = ?1 AND schedule_id = ?2",
            rusqlite::params![owner_id.to_string(), schedule_id.to_string()],
        )?;
        Ok(rows_changed)
    }

    fn list_runs(&self, owner_id: Uuid, filter: &RunFilter) -> Result<Vec<ExecutionRun>> {
        let owner = owner_id.to_string();
        let schedule_id = filter.schedule_id.map(|id| id.to_string());
        let status = filter.status.map(|s| s.to_string());
        let limit = filter.limit.unwrap_or(DEFAULT_RUN_LIMIT) as i64;
        let offset = filter.offset.unwrap_or(0) as i64;

        let mut sql = format!("SELECT {RUN_COLUMNS} FROM execution_runs WHERE owner_id = ?");
        let mut params: Vec<&dyn ToSql> = vec![&owner];
        if let Some(ref id) = schedule_id {
            sql.push_str(" AND schedule_id = ?");
            params.push(id);
        }
        if let Some(ref st) = status {
            sql.push_str(" AND status = ?");
            params.push(st);
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");
        params.push(&limit);
        params.push(&offset);

        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(&sql)?;
        let rows = stmt.query_map(&params[..], row_to_run)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }
}

const SCHEDULE_COLUMNS: &str = "id, owner_id, report_type, agent_alias, frequency, weekday, \
     time_of_day, timezone, rrule, priority, email, phone_number, channels, \
     active, paused, next_run, last_run, created_at, updated_at";

const RUN_COLUMNS: &str = "id, owner_id, schedule_id, status, output, error_message, \
     metadata, started_at, completed_at, created_at, updated_at";

/// Fixed-width RFC-3339 in UTC so lexicographic TEXT comparison matches
/// chronological order (the due-sweep relies on this).
fn encode_ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_ts(column: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e))
}

fn decode_opt_ts(column: usize, s: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    s.map(|s| decode_ts(column, &s)).transpose()
}

fn decode_uuid(column: usize, s: &str) -> rusqlite::Result<Uuid> {
    s.parse().map_err(|e| conversion_error(column, e))
}

fn conversion_error(
    column: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
}

fn row_to_schedule(row: &rusqlite::Row<'_>) -> rusqlite::Result<Schedule> {
    let frequency: String = row.get(4)?;
    let channels: String = row.get(12)?;
    Ok(Schedule {
        id: decode_uuid(0, &row.get::<_, String>(0)?)?,
        owner_id: decode_uuid(1, &row.get::<_, String>(1)?)?,
        report_type: row.get(2)?,
        agent_alias: row.get(3)?,
        frequency: frequency.parse().map_err(|e| conversion_error(4, e))?,
        weekday: row.get(5)?,
        time_of_day: row.get(6)?,
        timezone: row.get(7)?,
        rrule: row.get(8)?,
        priority: row.get(9)?,
        email: row.get(10)?,
        phone_number: row.get(11)?,
        channels: serde_json::from_str(&channels).map_err(|e| conversion_error(12, e))?,
        active: row.get(13)?,
        paused: row.get(14)?,
        next_run: decode_ts(15, &row.get::<_, String>(15)?)?,
        last_run: decode_opt_ts(16, row.get(16)?)?,
        created_at: decode_ts(17, &row.get::<_, String>(17)?)?,
        updated_at: decode_ts(18, &row.get::<_, String>(18)?)?,
    })
}

fn row_to_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExecutionRun> {
    let status: String = row.get(3)?;
    let metadata: String = row.get(6)?;
    Ok(ExecutionRun {
        id: decode_uuid(0, &row.get::<_, String>(0)?)?,
        owner_id: decode_uuid(1, &row.get::<_, String>(1)?)?,
        schedule_id: decode_uuid(2, &row.get::<_, String>(2)?)?,
        status: status
            .parse()
            .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                e.into(),
            ))?,
        output: row.get(4)?,
        error_message: row.get(5)?,
        metadata: serde_json::from_str(&metadata).map_err(|e| conversion_error(6, e))?,
        started_at: decode_opt_ts(7, row.get(7)?)?,
        completed_at: decode_opt_ts(8, row.get(8)?)?,
        created_at: decode_ts(9, &row.get::<_, String>(9)?)?,
        updated_at: decode_ts(10, &row.get::<_, String>(10)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Frequency, RunStatus, ScheduleDraft};
    use chrono::Duration;

    fn store() -> SqliteStore {
        SqliteStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn schedule(owner_id: Uuid) -> Schedule {
        let mut s = Schedule::new(ScheduleDraft {
            owner_id,
            report_type: "finance_digest".to_string(),
            agent_alias: "ledger".to_string(),
            frequency: Frequency::Daily,
            time_of_day: "09:00".to_string(),
            timezone: "UTC".to_string(),
            email: Some("owner@example.com".to_string()),
            ..Default::default()
        });
        s.validate().unwrap();
        s
    }

    #[test]
    fn schedule_round_trips() {
        let store = store();
        let owner = Uuid::new_v4();
        let s = schedule(owner);
        store.insert_schedule(&s).unwrap();

        let loaded = store.get_schedule(owner, s.id).unwrap().unwrap();
        assert_eq!(loaded.id, s.id);
        assert_eq!(loaded.report_type, "finance_digest");
        assert_eq!(loaded.frequency, Frequency::Daily);
        assert_eq!(loaded.channels, vec!["email"]);
        assert!(loaded.active);
        assert_eq!(
            loaded.next_run.timestamp_micros(),
            s.next_run.timestamp_micros()
        );
    }

    #[test]
    fn get_is_owner_scoped() {
        let store = store();
        let s = schedule(Uuid::new_v4());
        store.insert_schedule(&s).unwrap();
        assert!(store.get_schedule(Uuid::new_v4(), s.id).unwrap().is_none());
    }

    #[test]
    fn update_missing_schedule_is_not_found() {
        let store = store();
        let s = schedule(Uuid::new_v4());
        let err = store.update_schedule(&s).unwrap_err();
        assert!(matches!(err, SchedulerError::ScheduleNotFound { .. }));
    }

    #[test]
    fn list_for_owner_orders_by_next_run() {
        let store = store();
        let owner = Uuid::new_v4();
        let now = Utc::now();

        let mut later = schedule(owner);
        later.next_run = now + Duration::hours(5);
        let mut sooner = schedule(owner);
        sooner.next_run = now + Duration::hours(1);
        store.insert_schedule(&later).unwrap();
        store.insert_schedule(&sooner).unwrap();
        // Another owner's schedule must not leak in.
        store.insert_schedule(&schedule(Uuid::new_v4())).unwrap();

        let listed = store.list_for_owner(owner).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, sooner.id);
        assert_eq!(listed[1].id, later.id);
    }

    #[test]
    fn list_due_filters_flags_and_time() {
        let store = store();
        let now = Utc::now();

        let mut due = schedule(Uuid::new_v4());
        due.next_run = now - Duration::minutes(5);
        let mut future = schedule(Uuid::new_v4());
        future.next_run = now + Duration::hours(1);
        let mut paused = schedule(Uuid::new_v4());
        paused.next_run = now - Duration::minutes(5);
        paused.paused = true;
        let mut inactive = schedule(Uuid::new_v4());
        inactive.next_run = now - Duration::minutes(5);
        inactive.active = false;

        for s in [&due, &future, &paused, &inactive] {
            store.insert_schedule(s).unwrap();
        }

        let swept = store.list_due(now).unwrap();
        assert_eq!(swept.len(), 1);
        assert_eq!(swept[0].id, due.id);
    }

    #[test]
    fn bulk_deactivate_clears_paused_and_keeps_next_run() {
        let store = store();
        let owner = Uuid::new_v4();
        let mut a = schedule(owner);
        a.paused = true;
        let b = schedule(owner);
        store.insert_schedule(&a).unwrap();
        store.insert_schedule(&b).unwrap();

        let touched = store
            .set_active_bulk(owner, &[a.id, b.id], false)
            .unwrap();
        assert_eq!(touched, 2);

        for id in [a.id, b.id] {
            let s = store.get_schedule(owner, id).unwrap().unwrap();
            assert!(!s.active);
            assert!(!s.paused);
        }
        let reloaded = store.get_schedule(owner, a.id).unwrap().unwrap();
        assert_eq!(
            reloaded.next_run.timestamp_micros(),
            a.next_run.timestamp_micros()
        );
    }

    #[test]
    fn bulk_ops_are_owner_scoped_and_empty_safe() {
        let store = store();
        let owner = Uuid::new_v4();
        let s = schedule(owner);
        store.insert_schedule(&s).unwrap();

        assert_eq!(store.set_active_bulk(owner, &[], false).unwrap(), 0);
        // Wrong owner touches nothing.
        assert_eq!(
            store
                .set_paused_bulk(Uuid::new_v4(), &[s.id], true)
                .unwrap(),
            0
        );

        assert_eq!(store.set_paused_bulk(owner, &[s.id], true).unwrap(), 1);
        assert!(store.get_schedule(owner, s.id).unwrap().unwrap().paused);
    }

    #[test]
    fn update_missing_run_is_a_run_not_found() {
        let store = store();
        let run = ExecutionRun::new(Uuid::new_v4(), Uuid::new_v4());
        let err = store.update_run(&run).unwrap_err();
        assert!(matches!(err, SchedulerError::RunNotFound { .. }));
    }

    #[test]
    fn runs_round_trip_and_cascade() {
        let store = store();
        let owner = Uuid::new_v4();
        let s = schedule(owner);
        store.insert_schedule(&s).unwrap();

        let mut run = ExecutionRun::new(s.id, owner);
        run.metadata
            .insert("attempt".to_string(), serde_json::json!(1));
        store.insert_run(&run).unwrap();
        run.start(Utc::now()).unwrap();
        run.complete("dispatched", Utc::now()).unwrap();
        store.update_run(&run).unwrap();

        let listed = store.list_runs(owner, &RunFilter::default()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, RunStatus::Completed);
        assert_eq!(listed[0].output.as_deref(), Some("dispatched"));
        assert_eq!(listed[0].metadata["attempt"], serde_json::json!(1));

        assert_eq!(store.delete_runs_for_schedule(owner, s.id).unwrap(), 1);
        assert!(store.list_runs(owner, &RunFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn list_runs_filters_by_schedule_and_status() {
        let store = store();
        let owner = Uuid::new_v4();
        let s1 = schedule(owner);
        let s2 = schedule(owner);
        store.insert_schedule(&s1).unwrap();
        store.insert_schedule(&s2).unwrap();

        let mut failed = ExecutionRun::new(s1.id, owner);
        failed.start(Utc::now()).unwrap();
        failed.fail("boom", Utc::now()).unwrap();
        let pending = ExecutionRun::new(s2.id, owner);
        store.insert_run(&pending).unwrap();
        store.insert_run(&failed).unwrap();

        let only_s1 = store
            .list_runs(
                owner,
                &RunFilter {
                    schedule_id: Some(s1.id),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(only_s1.len(), 1);
        assert_eq!(only_s1[0].schedule_id, s1.id);

        let only_failed = store
            .list_runs(
                owner,
                &RunFilter {
                    status: Some(RunStatus::Failed),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(only_failed.len(), 1);
        assert_eq!(only_failed[0].error_message.as_deref(), Some("boom"));

        // Pagination: limit 1 gives one row, offset past the end gives none.
        let page = store
            .list_runs(
                owner,
                &RunFilter {
                    limit: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(page.len(), 1);
        let empty = store
            .list_runs(
                owner,
                &RunFilter {
                    offset: Some(10),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn delete_schedule_requires_ownership() {
        let store = store();
        let owner = Uuid::new_v4();
        let s = schedule(owner);
        store.insert_schedule(&s).unwrap();

        let err = store.delete_schedule(Uuid::new_v4(), s.id).unwrap_err();
        assert!(matches!(err, SchedulerError::ScheduleNotFound { .. }));
        store.delete_schedule(owner, s.id).unwrap();
        assert!(store.get_schedule(owner, s.id).unwrap().is_none());
    }
}
