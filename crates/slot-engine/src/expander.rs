//! Recurrence expansion -- turns weekly rules into concrete time slots.
//!
//! Each rule is clipped to the requested date window before anything is
//! enumerated, so unbounded rules are only ever iterated over that window.
//! Occurrence dates come from the `rrule` crate (a `FREQ=DAILY` rule filtered
//! by `BYDAY`); wall-clock bounds are then resolved in the caller's timezone.

use chrono::{Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use rrule::RRuleSet;

use crate::dst::{resolve_local, DstPolicy};
use crate::error::{EngineError, Result};
use crate::timeslot::{TimeSlot, TimeSlots};
use crate::weekly::{EndTime, WeeklyTime, WeeklyTimes};

/// Longest clipped window, in days, a single rule may be expanded over.
pub const MAX_EXPANSION_DAYS: i64 = u16::MAX as i64;

/// Expand weekly rules into the slots they cover between `window_start` and
/// `window_end` (both inclusive local dates). A window with its start after
/// its end yields no slots.
///
/// # Errors
/// Returns `EngineError::WindowTooLarge` if a clipped rule spans more than
/// [`MAX_EXPANSION_DAYS`], or `EngineError::Recurrence` if the recurrence
/// could not be evaluated.
pub fn get_time_slots_by_weekly_times(
    patterns: &WeeklyTimes,
    window_start: NaiveDate,
    window_end: NaiveDate,
    tz: Tz,
) -> Result<TimeSlots> {
    get_time_slots_by_weekly_times_with_policy(
        patterns,
        window_start,
        window_end,
        tz,
        DstPolicy::default(),
    )
}

/// Identical to [`get_time_slots_by_weekly_times`] with an explicit policy for
/// slot bounds that fall into a DST gap.
pub fn get_time_slots_by_weekly_times_with_policy(
    patterns: &WeeklyTimes,
    window_start: NaiveDate,
    window_end: NaiveDate,
    tz: Tz,
    policy: DstPolicy,
) -> Result<TimeSlots> {
    let mut slots = Vec::new();

    for rule in patterns {
        if !rule.is_valid() {
            continue;
        }
        let start = rule.start_date.map_or(window_start, |d| d.max(window_start));
        let end = rule.end_date.map_or(window_end, |d| d.min(window_end));
        if start > end {
            continue;
        }

        let dates = occurrence_dates(rule, start, end)?;
        tracing::trace!(%rule, %start, %end, occurrences = dates.len(), "expanded weekly rule");

        for date in dates {
            match slot_on(rule, date, tz, policy) {
                Some(slot) => slots.push(slot),
                None => tracing::warn!(%rule, %date, "skipped occurrence in DST gap"),
            }
        }
    }

    Ok(TimeSlots::new(slots))
}

/// Dates in `start..=end` whose weekday the rule includes.
fn occurrence_dates(rule: &WeeklyTime, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
    let days = (end - start).num_days() + 1;
    if days > MAX_EXPANSION_DAYS {
        return Err(EngineError::WindowTooLarge { days });
    }

    let byday: Vec<&str> = rule.days_of_week.iter().map(|d| d.ical_code()).collect();
    let rrule_text = format!(
        "DTSTART;TZID=UTC:{}T000000\nRRULE:FREQ=DAILY;BYDAY={};UNTIL={}T000000Z",
        start.format("%Y%m%d"),
        byday.join(","),
        end.format("%Y%m%d"),
    );

    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| EngineError::Recurrence(format!("{}", e)))?;

    // At most one occurrence per day, so the window length bounds the count.
    let instances = rrule_set.all(days as u16);
    Ok(instances
        .dates
        .into_iter()
        .map(|dt| dt.date_naive())
        .collect())
}

/// The concrete slot for one occurrence, or `None` if a bound is skipped.
fn slot_on(rule: &WeeklyTime, date: NaiveDate, tz: Tz, policy: DstPolicy) -> Option<TimeSlot> {
    let start = resolve_local(date.and_time(rule.start_time), tz, policy)?;
    let end_local = match rule.end_time {
        EndTime::At(time) => date.and_time(time),
        EndTime::EndOfDay => (date + Duration::days(1)).and_time(NaiveTime::MIN),
    };
    let end = resolve_local(end_local, tz, policy)?;
    // A shifted start can pass an end inside the same gap.
    TimeSlot::new(start, end).ok()
}
