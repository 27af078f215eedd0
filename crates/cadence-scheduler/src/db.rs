use rusqlite::Connection;

use crate::error::Result;

/// Initialise the scheduling schema in `conn`.
///
/// Creates the `schedules` and `execution_runs` tables (idempotent) plus an
/// index on `next_run` so the due-sweep query stays efficient with thousands
/// of schedules.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schedules (
            id            TEXT    NOT NULL PRIMARY KEY,
            owner_id      TEXT    NOT NULL,
            report_type   TEXT    NOT NULL,
            agent_alias   TEXT    NOT NULL,
            frequency     TEXT    NOT NULL,   -- daily | weekly | custom
            weekday       TEXT,               -- required for weekly
            time_of_day   TEXT    NOT NULL,   -- HH:MM, 24-hour
            timezone      TEXT    NOT NULL DEFAULT 'UTC',
            rrule         TEXT,               -- required for custom
            priority      INTEGER NOT NULL DEFAULT 0,
            email         TEXT,
            phone_number  TEXT,
            channels      TEXT    NOT NULL DEFAULT '[]',  -- JSON array of names
            active        INTEGER NOT NULL DEFAULT 1,
            paused        INTEGER NOT NULL DEFAULT 0,
            next_run      TEXT    NOT NULL,   -- ISO-8601 UTC
            last_run      TEXT,               -- ISO-8601 UTC or NULL
            created_at    TEXT    NOT NULL,
            updated_at    TEXT    NOT NULL
        ) STRICT;

        -- Efficient sweeping: SELECT … WHERE next_run <= ?  ORDER BY next_run
        CREATE INDEX IF NOT EXISTS idx_schedules_next_run ON schedules (next_run);
        CREATE INDEX IF NOT EXISTS idx_schedules_owner ON schedules (owner_id);

        CREATE TABLE IF NOT EXISTS execution_runs (
            id            TEXT    NOT NULL PRIMARY KEY,
            owner_id      TEXT    NOT NULL,
            schedule_id   TEXT    NOT NULL,
            status        TEXT    NOT NULL DEFAULT 'pending',
            output        TEXT,
            error_message TEXT,
            metadata      TEXT    NOT NULL DEFAULT '{}',  -- opaque JSON object
            started_at    TEXT,
            completed_at  TEXT,
            created_at    TEXT    NOT NULL,
            updated_at    TEXT    NOT NULL
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_runs_owner_schedule
            ON execution_runs (owner_id, schedule_id);
        CREATE INDEX IF NOT EXISTS idx_runs_schedule ON execution_runs (schedule_id);
        ",
    )?;
    Ok(())
}
