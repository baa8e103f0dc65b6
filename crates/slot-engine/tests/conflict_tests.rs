//! Tests for the demand overlay engine and feasibility checks.

use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};
use slot_engine::matching::{brute_force, hopcroft_karp, BRUTE_FORCE_LIMIT};
use slot_engine::{flatten_events, get_conflicting_timeslots, has_resolvable_resource_groups};
use slot_engine::{ResourceId, SimpleEvent, TimeSlot};

/// Helper to create a TimeSlot from hour ranges on 2025-07-01.
fn slot(start_hour: u32, end_hour: u32) -> TimeSlot {
    TimeSlot::new(
        Utc.with_ymd_and_hms(2025, 7, 1, start_hour, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 7, 1, end_hour, 0, 0).unwrap(),
    )
    .unwrap()
}

fn set(ids: &[u64]) -> BTreeSet<ResourceId> {
    ids.iter().map(|id| ResourceId(*id)).collect()
}

fn groups(sets: &[&[u64]]) -> Vec<BTreeSet<ResourceId>> {
    sets.iter().map(|ids| set(ids)).collect()
}

fn event(start_hour: u32, end_hour: u32, sets: &[&[u64]]) -> SimpleEvent {
    SimpleEvent::new(slot(start_hour, end_hour), groups(sets))
}

// ── flatten_events ──────────────────────────────────────────────────────────

#[test]
fn flatten_splits_overlaps_and_concatenates_demands() {
    let events = vec![
        event(9, 12, &[&[1]]),  // first
        event(9, 13, &[&[2]]),  // same start
        event(10, 11, &[&[3]]), // inside another
        event(11, 13, &[&[4]]), // touching another, same end
        event(14, 15, &[&[5]]), // not overlapping
    ];

    let flattened = flatten_events(&events);

    assert_eq!(
        flattened,
        vec![
            event(9, 10, &[&[1], &[2]]),
            event(10, 11, &[&[1], &[2], &[3]]),
            event(11, 12, &[&[1], &[2], &[4]]),
            event(12, 13, &[&[2], &[4]]),
            event(14, 15, &[&[5]]),
        ]
    );
}

#[test]
fn flatten_of_nothing_is_empty() {
    assert!(flatten_events(&[]).is_empty());
}

#[test]
fn flatten_inserts_earlier_event_before_existing_ones() {
    let events = vec![event(12, 14, &[&[1]]), event(9, 10, &[&[2]])];
    assert_eq!(
        flatten_events(&events),
        vec![event(9, 10, &[&[2]]), event(12, 14, &[&[1]])]
    );
}

#[test]
fn flatten_new_event_spanning_several_intervals() {
    let events = vec![
        event(9, 10, &[&[1]]),
        event(11, 12, &[&[2]]),
        event(8, 13, &[&[3]]),
    ];
    assert_eq!(
        flatten_events(&events),
        vec![
            event(8, 9, &[&[3]]),
            event(9, 10, &[&[1], &[3]]),
            event(10, 11, &[&[3]]),
            event(11, 12, &[&[2], &[3]]),
            event(12, 13, &[&[3]]),
        ]
    );
}

#[test]
fn flattened_intervals_are_disjoint_and_ordered() {
    let events = vec![
        event(9, 17, &[&[1, 2]]),
        event(10, 12, &[&[1]]),
        event(11, 15, &[&[2]]),
        event(16, 18, &[&[3]]),
        event(8, 9, &[&[4]]),
    ];
    let flattened = flatten_events(&events);
    for pair in flattened.windows(2) {
        assert!(pair[0].timeslot.end() <= pair[1].timeslot.start());
    }
}

// ── has_resolvable_resource_groups ──────────────────────────────────────────

#[test]
fn resolvability_table() {
    let cases: Vec<(Vec<BTreeSet<ResourceId>>, bool)> = vec![
        (groups(&[]), true),
        (groups(&[&[1]]), true),
        (groups(&[&[1], &[1]]), false),
        (groups(&[&[1, 2, 3]]), true),
        (groups(&[&[1], &[2], &[3]]), true),
        (groups(&[&[1, 2], &[1, 2], &[3]]), true),
        (groups(&[&[1, 2], &[1, 2], &[1, 2]]), false),
        (groups(&[&[1, 2, 3], &[1, 2], &[1]]), true),
        (groups(&[&[]]), false),
    ];

    for (demands, expected) in cases {
        assert_eq!(has_resolvable_resource_groups(&demands), expected, "{demands:?}");
        assert_eq!(brute_force(&demands), expected, "brute force {demands:?}");
        assert_eq!(hopcroft_karp(&demands), expected, "matching {demands:?}");
    }
}

#[test]
fn large_fan_out_uses_matching_with_same_answer() {
    // Six demands over six resources, solvable only by a chain of swaps.
    let solvable = groups(&[&[1, 2], &[2, 3], &[3, 4], &[4, 5], &[5, 6], &[1]]);
    assert!(solvable.len() > BRUTE_FORCE_LIMIT);
    assert!(has_resolvable_resource_groups(&solvable));
    assert!(brute_force(&solvable));

    // Seven demands over six resources.
    let mut crowded = solvable.clone();
    crowded.push(set(&[1, 2, 3, 4, 5, 6]));
    assert!(!has_resolvable_resource_groups(&crowded));
    assert!(!brute_force(&crowded));
}

#[test]
fn same_single_resource_twice_is_unresolvable() {
    let same = SimpleEvent::new(slot(9, 10), groups(&[&[1], &[1]]));
    let distinct = SimpleEvent::new(slot(9, 10), groups(&[&[1], &[2]]));
    assert!(!same.has_resolvable_resource_groups());
    assert!(distinct.has_resolvable_resource_groups());
}

#[test]
fn blocking_event_is_never_resolvable() {
    assert!(!SimpleEvent::blocking(slot(9, 10)).has_resolvable_resource_groups());
    assert!(SimpleEvent::single(slot(9, 10), ResourceId(7)).has_resolvable_resource_groups());
}

// ── get_conflicting_timeslots ───────────────────────────────────────────────

#[test]
fn no_events_no_conflicts() {
    assert!(get_conflicting_timeslots(&[]).is_empty());
}

#[test]
fn two_demands_for_one_resource_conflict_where_they_overlap() {
    let events = vec![event(9, 12, &[&[1]]), event(11, 14, &[&[1]])];
    assert_eq!(get_conflicting_timeslots(&events), vec![slot(11, 12)]);
}

#[test]
fn demands_for_different_resources_do_not_conflict() {
    let events = vec![event(9, 12, &[&[1]]), event(11, 14, &[&[2]])];
    assert!(get_conflicting_timeslots(&events).is_empty());
}

#[test]
fn group_absorbs_one_extra_demand_but_not_two() {
    let events = vec![
        event(8, 18, &[&[1, 2]]), // needs one of two rooms all day
        event(9, 12, &[&[1]]),    // room 1 booked
        event(11, 13, &[&[2]]),   // room 2 booked
    ];
    assert_eq!(get_conflicting_timeslots(&events), vec![slot(11, 12)]);
}

#[test]
fn blocking_event_conflicts_over_its_whole_span() {
    let events = vec![
        event(8, 18, &[&[1]]),
        SimpleEvent::blocking(slot(12, 13)),
    ];
    assert_eq!(get_conflicting_timeslots(&events), vec![slot(12, 13)]);
}
