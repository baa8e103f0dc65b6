//! Tests for expanding weekly rules into concrete time slots.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use slot_engine::expander::{get_time_slots_by_weekly_times_with_policy, MAX_EXPANSION_DAYS};
use slot_engine::{
    get_time_slots_by_weekly_times, DayOfWeek, DstPolicy, EndTime, EngineError, TimeSlot,
    TimeSlots, WeeklyTime, WeeklyTimes,
};

use DayOfWeek::*;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
}

fn weekly(days: &[DayOfWeek], start: u32, end_hour: u32) -> WeeklyTime {
    WeeklyTime::new(
        days.iter().copied().collect(),
        NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
        EndTime::from_wall_clock(NaiveTime::from_hms_opt(end_hour, 0, 0).unwrap()),
    )
}

/// A UTC slot in July 2025.
fn slot(start_day: u32, start_hour: u32, end_day: u32, end_hour: u32) -> TimeSlot {
    TimeSlot::new(
        Utc.with_ymd_and_hms(2025, 7, start_day, start_hour, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 7, end_day, end_hour, 0, 0).unwrap(),
    )
    .unwrap()
}

fn expand(rules: Vec<WeeklyTime>, start: NaiveDate, end: NaiveDate) -> TimeSlots {
    get_time_slots_by_weekly_times(&WeeklyTimes::new(rules), start, end, chrono_tz::UTC).unwrap()
}

// ── Basic expansion ─────────────────────────────────────────────────────────

#[test]
fn expands_and_merges_rules_within_the_window() {
    // 2025-07-01 is a Tuesday, 2025-07-07 a Monday.
    let slots = expand(
        vec![
            weekly(&[Monday, Tuesday, Wednesday], 9, 12),
            weekly(&[Wednesday, Thursday], 10, 0).between(Some(date(2)), Some(date(3))),
        ],
        date(1),
        date(7),
    );

    assert_eq!(
        slots.as_slice(),
        &[
            slot(1, 9, 1, 12),
            slot(2, 9, 3, 0),
            slot(3, 10, 4, 0),
            slot(7, 9, 7, 12),
        ]
    );
}

#[test]
fn rule_dates_outside_the_window_yield_nothing() {
    let slots = expand(
        vec![weekly(&[Wednesday, Thursday], 10, 13).between(Some(date(2)), Some(date(3)))],
        date(10),
        date(20),
    );
    assert!(slots.is_empty());
}

#[test]
fn unlimited_rule_covers_the_whole_window() {
    let slots = get_time_slots_by_weekly_times(
        &WeeklyTimes::unlimited(),
        date(1),
        date(2),
        chrono_tz::UTC,
    )
    .unwrap();
    assert_eq!(slots.as_slice(), &[slot(1, 0, 3, 0)]);
}

#[test]
fn end_of_day_rule_clipped_to_two_day_window() {
    // Window Tuesday..Wednesday: only Wednesday is both in the rule and window.
    let slots = expand(vec![weekly(&[Wednesday, Thursday], 10, 0)], date(1), date(2));
    assert_eq!(slots.as_slice(), &[slot(2, 10, 3, 0)]);
}

#[test]
fn reversed_window_is_empty_not_an_error() {
    let slots = expand(vec![WeeklyTime::unlimited()], date(7), date(1));
    assert!(slots.is_empty());
}

#[test]
fn invalid_rules_are_ignored() {
    let slots = expand(
        vec![weekly(&[], 9, 12), weekly(&[Monday], 12, 9), weekly(&[Monday], 9, 10)],
        date(1),
        date(7),
    );
    assert_eq!(slots.as_slice(), &[slot(7, 9, 7, 10)]);
}

#[test]
fn no_rules_no_slots() {
    assert!(expand(vec![], date(1), date(31)).is_empty());
}

// ── Window cap ──────────────────────────────────────────────────────────────

#[test]
fn oversized_window_is_rejected() {
    let start = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2100, 1, 1).unwrap();
    let result = get_time_slots_by_weekly_times(
        &WeeklyTimes::unlimited(),
        start,
        end,
        chrono_tz::UTC,
    );
    assert!(matches!(result, Err(EngineError::WindowTooLarge { days }) if days > MAX_EXPANSION_DAYS));
}

#[test]
fn oversized_window_is_fine_when_the_rule_is_bounded() {
    let start = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2100, 1, 1).unwrap();
    let rule = weekly(&[Tuesday], 9, 10).between(Some(date(1)), Some(date(1)));
    let slots = get_time_slots_by_weekly_times(&WeeklyTimes::new(vec![rule]), start, end, chrono_tz::UTC)
        .unwrap();
    assert_eq!(slots.as_slice(), &[slot(1, 9, 1, 10)]);
}

// ── Timezones and DST ───────────────────────────────────────────────────────

#[test]
fn wall_clock_times_follow_the_timezone() {
    let tz: Tz = "America/New_York".parse().unwrap();
    let slots = get_time_slots_by_weekly_times(
        &WeeklyTimes::new(vec![weekly(&[Tuesday], 9, 17)]),
        date(1),
        date(1),
        tz,
    )
    .unwrap();
    // EDT is UTC-4.
    assert_eq!(slots.as_slice(), &[slot(1, 13, 1, 21)]);
}

#[test]
fn spring_forward_gap_is_shifted_or_skipped() {
    let tz: Tz = "Europe/Prague".parse().unwrap();
    let sunday = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
    let rule = WeeklyTime::new(
        [Sunday].into_iter().collect(),
        NaiveTime::from_hms_opt(2, 30, 0).unwrap(),
        EndTime::At(NaiveTime::from_hms_opt(4, 0, 0).unwrap()),
    );
    let rules = WeeklyTimes::new(vec![rule]);

    let shifted =
        get_time_slots_by_weekly_times_with_policy(&rules, sunday, sunday, tz, DstPolicy::ShiftForward)
            .unwrap();
    // 02:30 does not exist; read with the CET offset it lands at 01:30 UTC,
    // i.e. 03:30 CEST. 04:00 CEST is 02:00 UTC.
    assert_eq!(
        shifted.as_slice(),
        &[TimeSlot::new(
            Utc.with_ymd_and_hms(2025, 3, 30, 1, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 30, 2, 0, 0).unwrap(),
        )
        .unwrap()]
    );

    let skipped =
        get_time_slots_by_weekly_times_with_policy(&rules, sunday, sunday, tz, DstPolicy::Skip)
            .unwrap();
    assert!(skipped.is_empty());
}

#[test]
fn end_of_day_on_short_day_ends_at_next_local_midnight() {
    let tz: Tz = "Europe/Prague".parse().unwrap();
    let sunday = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
    let slots = get_time_slots_by_weekly_times(
        &WeeklyTimes::unlimited(),
        sunday,
        sunday,
        tz,
    )
    .unwrap();
    // Midnight CET (23:00 UTC the day before) to midnight CEST (22:00 UTC).
    assert_eq!(
        slots.as_slice(),
        &[TimeSlot::new(
            Utc.with_ymd_and_hms(2025, 3, 29, 23, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 30, 22, 0, 0).unwrap(),
        )
        .unwrap()]
    );
    assert_eq!(slots.total_duration().num_hours(), 23);
}
