//! Overlay of resource demands and detection of unresolvable intervals.
//!
//! Demands arrive as [`SimpleEvent`]s that may overlap arbitrarily. Flattening
//! splits them into disjoint elementary intervals, each carrying every demand
//! active during it. An interval conflicts when its demands cannot all be
//! served by distinct resources.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::matching::has_resolvable_resource_groups;
use crate::resources::ResourceId;
use crate::timeslot::TimeSlot;

/// A time slot together with the demands active during it. Each demand can be
/// met by any one resource from its set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleEvent {
    pub timeslot: TimeSlot,
    pub resource_groups: Vec<BTreeSet<ResourceId>>,
}

impl SimpleEvent {
    pub fn new(timeslot: TimeSlot, resource_groups: Vec<BTreeSet<ResourceId>>) -> Self {
        Self {
            timeslot,
            resource_groups,
        }
    }

    /// A demand only `resource` can satisfy.
    pub fn single(timeslot: TimeSlot, resource: ResourceId) -> Self {
        Self::new(timeslot, vec![BTreeSet::from([resource])])
    }

    /// An unconditional block: one demand no resource can satisfy.
    pub fn blocking(timeslot: TimeSlot) -> Self {
        Self::new(timeslot, vec![BTreeSet::new()])
    }

    pub fn has_resolvable_resource_groups(&self) -> bool {
        has_resolvable_resource_groups(&self.resource_groups)
    }

    fn with_slot(&self, timeslot: TimeSlot) -> Self {
        Self::new(timeslot, self.resource_groups.clone())
    }
}

/// Merge one event into an ordered, non-overlapping sequence.
fn add_event(flattened: Vec<SimpleEvent>, event: &SimpleEvent) -> Vec<SimpleEvent> {
    let mut result = Vec::with_capacity(flattened.len() + 3);
    let mut pending = Some(event.clone());

    for current in flattened {
        let Some(new) = pending.take() else {
            result.push(current);
            continue;
        };
        let (cur_slot, new_slot) = (current.timeslot, new.timeslot);

        if cur_slot.end() <= new_slot.start() {
            result.push(current);
            pending = Some(new);
            continue;
        }
        if cur_slot.start() >= new_slot.end() {
            result.push(new);
            result.push(current);
            continue;
        }

        // Leading part covered by only one of the two.
        if cur_slot.start() < new_slot.start() {
            result.push(current.with_slot(TimeSlot::from_ordered(cur_slot.start(), new_slot.start())));
        } else if new_slot.start() < cur_slot.start() {
            result.push(new.with_slot(TimeSlot::from_ordered(new_slot.start(), cur_slot.start())));
        }

        let overlap_start = cur_slot.start().max(new_slot.start());
        let overlap_end = cur_slot.end().min(new_slot.end());
        let mut groups = current.resource_groups.clone();
        groups.extend(new.resource_groups.iter().cloned());
        result.push(SimpleEvent::new(
            TimeSlot::from_ordered(overlap_start, overlap_end),
            groups,
        ));

        if cur_slot.end() > overlap_end {
            result.push(current.with_slot(TimeSlot::from_ordered(overlap_end, cur_slot.end())));
        }
        // The rest of the new event still has to meet later intervals.
        if new_slot.end() > overlap_end {
            pending = Some(new.with_slot(TimeSlot::from_ordered(overlap_end, new_slot.end())));
        }
    }

    result.extend(pending);
    result
}

/// Split possibly overlapping events into disjoint, ordered elementary
/// intervals. Where events overlap, the interval's demands are the
/// concatenation of theirs, in insertion order.
pub fn flatten_events<'a, I>(events: I) -> Vec<SimpleEvent>
where
    I: IntoIterator<Item = &'a SimpleEvent>,
{
    events.into_iter().fold(Vec::new(), add_event)
}

/// Elementary intervals whose demands cannot be met by distinct resources.
pub fn get_conflicting_timeslots<'a, I>(events: I) -> Vec<TimeSlot>
where
    I: IntoIterator<Item = &'a SimpleEvent>,
{
    flatten_events(events)
        .into_iter()
        .filter(|event| !event.has_resolvable_resource_groups())
        .map(|event| event.timeslot)
        .collect()
}
