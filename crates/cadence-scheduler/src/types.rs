use cadence_core::DispatchOptions;
use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{SchedulerError, ValidationError};

/// How often a schedule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Every day at `time_of_day`.
    #[default]
    Daily,
    /// Every week on `weekday` at `time_of_day`.
    Weekly,
    /// According to an RFC-5545 recurrence rule.
    Custom,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Custom => "custom",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "custom" => Ok(Frequency::Custom),
            other => Err(ValidationError::UnsupportedFrequency(other.to_string())),
        }
    }
}

/// Lifecycle state of a single dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Recorded, attempt not yet started.
    Pending,
    /// Attempt in flight (`started_at` set).
    Running,
    /// Report generated and dispatched.
    Completed,
    /// Generation or dispatch returned an error.
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RunStatus::Pending),
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            other => Err(format!("unknown run status: {other}")),
        }
    }
}

/// Caller-supplied fields for creating a schedule.
///
/// Identity, timestamps and derived state are assigned by [`Schedule::new`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleDraft {
    pub owner_id: Uuid,
    pub report_type: String,
    pub agent_alias: String,
    pub frequency: Frequency,
    pub weekday: Option<String>,
    /// "HH:MM", 24-hour.
    pub time_of_day: String,
    /// IANA zone name; blank means UTC.
    pub timezone: String,
    pub rrule: Option<String>,
    pub priority: i32,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

/// A persisted recurrence definition plus lifecycle flags and the next
/// computed trigger instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub report_type: String,
    pub agent_alias: String,
    pub frequency: Frequency,
    /// Required iff `frequency` is weekly. Full name or three-letter
    /// abbreviation, case-insensitive ("monday", "Mon").
    pub weekday: Option<String>,
    pub time_of_day: String,
    pub timezone: String,
    /// Required iff `frequency` is custom.
    pub rrule: Option<String>,
    /// Informational ordering hint; not interpreted by the engine.
    pub priority: i32,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    /// Lowercase channel names derived from populated contact fields.
    pub channels: Vec<String>,
    pub active: bool,
    pub paused: bool,
    pub next_run: DateTime<Utc>,
    pub last_run: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    /// Build a new schedule from a draft with a fresh identity and UTC
    /// timestamps. `next_run` is a placeholder until the orchestrator
    /// computes the real one.
    pub fn new(draft: ScheduleDraft) -> Self {
        let now = Utc::now();
        let channels = derive_channels(draft.email.as_deref(), draft.phone_number.as_deref());
        Self {
            id: Uuid::new_v4(),
            owner_id: draft.owner_id,
            report_type: draft.report_type,
            agent_alias: draft.agent_alias,
            frequency: draft.frequency,
            weekday: draft.weekday,
            time_of_day: draft.time_of_day,
            timezone: draft.timezone,
            rrule: draft.rrule,
            priority: draft.priority,
            email: draft.email,
            phone_number: draft.phone_number,
            channels,
            active: true,
            paused: false,
            next_run: now,
            last_run: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check the schedule invariants, normalizing a blank timezone to UTC
    /// and re-deriving the channels set. No other field is mutated.
    pub fn validate(&mut self) -> std::result::Result<(), ValidationError> {
        if self.owner_id.is_nil() {
            return Err(ValidationError::MissingOwner);
        }
        if self.id.is_nil() {
            return Err(ValidationError::MissingId);
        }
        if self.report_type.trim().is_empty() {
            return Err(ValidationError::MissingReportType);
        }
        if self.agent_alias.trim().is_empty() {
            return Err(ValidationError::MissingAgentAlias);
        }
        match self.frequency {
            Frequency::Weekly => {
                let weekday = self
                    .weekday
                    .as_deref()
                    .map(str::trim)
                    .filter(|w| !w.is_empty())
                    .ok_or(ValidationError::MissingWeekday)?;
                parse_weekday(weekday)?;
            }
            Frequency::Custom => {
                let has_rule = self
                    .rrule
                    .as_deref()
                    .is_some_and(|r| !r.trim().is_empty());
                if !has_rule {
                    return Err(ValidationError::MissingRrule);
                }
            }
            Frequency::Daily => {}
        }
        if self.time_of_day.trim().is_empty() {
            return Err(ValidationError::MissingTimeOfDay);
        }
        parse_time_of_day(&self.time_of_day)?;
        if self.timezone.trim().is_empty() {
            self.timezone = "UTC".to_string();
        }
        self.channels = derive_channels(self.email.as_deref(), self.phone_number.as_deref());
        Ok(())
    }

    /// Flag flip only; `next_run` is deliberately left alone so a resumed
    /// schedule keeps its previously computed (possibly past) trigger.
    pub fn pause(&mut self) {
        self.paused = true;
        self.updated_at = Utc::now();
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.updated_at = Utc::now();
    }

    /// Record a finished attempt: `last_run` moves to `now` and `next_run`
    /// to the freshly computed occurrence.
    pub fn mark_executed(&mut self, next_run: DateTime<Utc>, now: DateTime<Utc>) {
        self.last_run = Some(now);
        self.next_run = next_run;
        self.updated_at = now;
    }

    /// Delivery options for the dispatch collaborator, derived from the
    /// schedule's contact fields.
    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            send_email: self.email.as_deref().is_some_and(|e| !e.trim().is_empty()),
            email_address: self.email.clone(),
            send_whatsapp: self
                .phone_number
                .as_deref()
                .is_some_and(|p| !p.trim().is_empty()),
            phone_number: self.phone_number.clone(),
            agent_alias: self.agent_alias.clone(),
        }
    }
}

/// Lowercase channel names for each populated contact field.
pub fn derive_channels(email: Option<&str>, phone_number: Option<&str>) -> Vec<String> {
    let mut channels = Vec::new();
    if email.is_some_and(|e| !e.trim().is_empty()) {
        channels.push("email".to_string());
    }
    if phone_number.is_some_and(|p| !p.trim().is_empty()) {
        channels.push("whatsapp".to_string());
    }
    channels
}

/// Parse "HH:MM" (24-hour). Range violations (25:00, 09:61) are rejected
/// here at validation time, never inside the recurrence calculator.
pub fn parse_time_of_day(s: &str) -> std::result::Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| ValidationError::InvalidTimeOfDay(s.to_string()))
}

/// Parse a weekday name ("monday", "Mon"), case-insensitive.
pub fn parse_weekday(s: &str) -> std::result::Result<Weekday, ValidationError> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| ValidationError::InvalidWeekday(s.to_string()))
}

/// Partial update for [`Schedule`]. `None` means "unchanged"; the boolean
/// flags are `Option<bool>` so an explicit `false` is representable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    pub report_type: Option<String>,
    pub agent_alias: Option<String>,
    pub frequency: Option<Frequency>,
    pub weekday: Option<String>,
    pub time_of_day: Option<String>,
    pub timezone: Option<String>,
    pub rrule: Option<String>,
    pub priority: Option<i32>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub active: Option<bool>,
    pub paused: Option<bool>,
}

impl ScheduleUpdate {
    /// Merge the provided fields into `schedule`. Empty strings count as
    /// "unchanged", matching the nil/empty semantics of the public API.
    pub fn apply_to(&self, schedule: &mut Schedule) {
        apply_string(&self.report_type, &mut schedule.report_type);
        apply_string(&self.agent_alias, &mut schedule.agent_alias);
        if let Some(freq) = self.frequency {
            schedule.frequency = freq;
        }
        apply_opt_string(&self.weekday, &mut schedule.weekday);
        apply_string(&self.time_of_day, &mut schedule.time_of_day);
        apply_string(&self.timezone, &mut schedule.timezone);
        apply_opt_string(&self.rrule, &mut schedule.rrule);
        if let Some(priority) = self.priority {
            schedule.priority = priority;
        }
        apply_opt_string(&self.email, &mut schedule.email);
        apply_opt_string(&self.phone_number, &mut schedule.phone_number);
        if let Some(active) = self.active {
            schedule.active = active;
        }
        if let Some(paused) = self.paused {
            schedule.paused = paused;
        }
    }
}

fn apply_string(src: &Option<String>, dst: &mut String) {
    if let Some(s) = src {
        if !s.trim().is_empty() {
            *dst = s.clone();
        }
    }
}

fn apply_opt_string(src: &Option<String>, dst: &mut Option<String>) {
    if let Some(s) = src {
        if !s.trim().is_empty() {
            *dst = Some(s.clone());
        }
    }
}

/// One recorded attempt to fire a schedule.
///
/// Attempts only move forward: pending → running → completed | failed.
/// A retry is always a new row, never a reset of an old one, so the run
/// table is a strict audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRun {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub schedule_id: Uuid,
    pub status: RunStatus,
    /// Short summary of what was produced, set on completion.
    pub output: Option<String>,
    /// Trimmed message from the underlying error, set on failure.
    pub error_message: Option<String>,
    /// Opaque key/value bag; the engine never interprets it.
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExecutionRun {
    pub fn new(schedule_id: Uuid, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            schedule_id,
            status: RunStatus::Pending,
            output: None,
            error_message: None,
            metadata: serde_json::Map::new(),
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// pending → running.
    pub fn start(&mut self, now: DateTime<Utc>) -> std::result::Result<(), SchedulerError> {
        if self.status != RunStatus::Pending {
            return Err(SchedulerError::InvalidRunTransition {
                from: self.status,
                to: RunStatus::Running,
            });
        }
        self.status = RunStatus::Running;
        self.started_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// running → completed.
    pub fn complete(
        &mut self,
        output: impl Into<String>,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), SchedulerError> {
        if self.status.is_terminal() {
            return Err(SchedulerError::InvalidRunTransition {
                from: self.status,
                to: RunStatus::Completed,
            });
        }
        self.status = RunStatus::Completed;
        self.output = Some(output.into());
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// running → failed. The message is trimmed before recording.
    pub fn fail(
        &mut self,
        message: impl AsRef<str>,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), SchedulerError> {
        if self.status.is_terminal() {
            return Err(SchedulerError::InvalidRunTransition {
                from: self.status,
                to: RunStatus::Failed,
            });
        }
        self.status = RunStatus::Failed;
        self.error_message = Some(message.as_ref().trim().to_string());
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

/// Filter for run-history listings. Unset limit defaults to 50.
#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    pub schedule_id: Option<Uuid>,
    pub status: Option<RunStatus>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}
