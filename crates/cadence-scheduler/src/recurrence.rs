use chrono::{DateTime, Datelike, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rrule::RRuleSet;
use tracing::warn;

use crate::error::{Result, SchedulerError};
use crate::types::{parse_time_of_day, parse_weekday, Frequency, Schedule};

/// How many rule occurrences the custom branch will materialize while
/// looking for the first one after the reference.
const RRULE_SCAN_LIMIT: u16 = 64;

/// Compute the next trigger instant for `schedule`, strictly after
/// `reference` (never equal), always expressed in UTC.
///
/// Range checks on `time_of_day` happen at validation time; this function
/// assumes a validated schedule. An unresolvable IANA zone name falls back
/// to UTC rather than failing.
pub fn compute_next_run(schedule: &Schedule, reference: DateTime<Utc>) -> Result<DateTime<Utc>> {
    match schedule.frequency {
        Frequency::Daily => next_daily(schedule, reference),
        Frequency::Weekly => next_weekly(schedule, reference),
        Frequency::Custom => next_custom(schedule, reference),
    }
}

fn next_daily(schedule: &Schedule, reference: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let time = parse_time_of_day(&schedule.time_of_day)?;
    let tz = resolve_zone(&schedule.timezone);

    // Candidate at HH:MM on the reference's calendar date in the schedule's
    // zone, stepping by local calendar day when it has already passed. A
    // fall-back day spans 25 UTC hours, so a fixed 24-hour step could land
    // before the reference.
    let mut date = reference.with_timezone(&tz).date_naive();
    let mut candidate = local_candidate(tz, date, time);
    while candidate <= reference {
        date = date.succ_opt().ok_or_else(|| {
            SchedulerError::NextRunUnavailable(format!("calendar overflow after {reference}"))
        })?;
        candidate = local_candidate(tz, date, time);
    }
    Ok(candidate)
}

fn next_weekly(schedule: &Schedule, reference: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let time = parse_time_of_day(&schedule.time_of_day)?;
    let weekday_name = schedule.weekday.as_deref().unwrap_or_default();
    let target = parse_weekday(weekday_name)?;
    let tz = resolve_zone(&schedule.timezone);

    // One local calendar day per step (never a fixed 24 hours, which would
    // let DST transitions repeat or skip a weekday); a 7-day window must
    // contain the target, so at most 7 advances past the initial date.
    let mut date = reference.with_timezone(&tz).date_naive();
    for _ in 0..=7 {
        let candidate = local_candidate(tz, date, time);
        if candidate > reference && candidate.with_timezone(&tz).weekday() == target {
            return Ok(candidate);
        }
        date = date.succ_opt().ok_or_else(|| {
            SchedulerError::NextRunUnavailable(format!("calendar overflow after {reference}"))
        })?;
    }
    Err(SchedulerError::NextRunUnavailable(format!(
        "no {weekday_name} occurrence within a week of {reference}"
    )))
}

fn next_custom(schedule: &Schedule, reference: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let raw = schedule.rrule.as_deref().map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(SchedulerError::NextRunUnavailable(
            "empty recurrence rule".to_string(),
        ));
    }
    let tz = resolve_zone(&schedule.timezone);

    let text = if raw.contains("DTSTART") {
        raw.to_string()
    } else {
        // No DTSTART in the rule: anchor it at the reference instant in the
        // schedule's zone so zone-relative parts (BYDAY, BYHOUR) line up.
        let body = raw.strip_prefix("RRULE:").unwrap_or(raw);
        let local_ref = reference.with_timezone(&tz);
        format!(
            "DTSTART;TZID={}:{}\nRRULE:{}",
            tz.name(),
            local_ref.format("%Y%m%dT%H%M%S"),
            body
        )
    };

    let set: RRuleSet = text.parse().map_err(|e| {
        SchedulerError::NextRunUnavailable(format!("invalid rrule {raw:?}: {e}"))
    })?;

    let cutoff = reference.with_timezone(&rrule::Tz::UTC);
    set.after(cutoff)
        .all(RRULE_SCAN_LIMIT)
        .dates
        .into_iter()
        .map(|occurrence| occurrence.with_timezone(&Utc))
        .find(|occurrence| *occurrence > reference)
        .ok_or_else(|| {
            SchedulerError::NextRunUnavailable(format!(
                "rule {raw:?} has no occurrence after {reference}"
            ))
        })
}

/// Resolve an IANA zone name, falling back to UTC when it does not parse.
fn resolve_zone(name: &str) -> Tz {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Tz::UTC;
    }
    trimmed.parse().unwrap_or_else(|_| {
        warn!(zone = %trimmed, "unresolvable timezone, falling back to UTC");
        Tz::UTC
    })
}

/// Map a wall-clock date+time in `tz` to a UTC instant.
///
/// A spring-forward gap can swallow the wall-clock time entirely; roll to
/// the next day when that happens. Ambiguous fall-back times take the
/// earlier mapping.
fn local_candidate(tz: Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let mut date = date;
    for _ in 0..3 {
        match tz.from_local_datetime(&date.and_time(time)) {
            LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => {
                date = date.succ_opt().unwrap_or(date);
            }
        }
    }
    Utc.from_utc_datetime(&date.and_time(time))
}
