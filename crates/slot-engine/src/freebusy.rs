//! Complements and buffers over normalized time slots.
//!
//! Free time is the window minus busy time, and busy time the window minus
//! free time: both directions are the same subtraction.

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;

use crate::error::{EngineError, Result};
use crate::timeslot::{TimeSlot, TimeSlots};

/// The parts of the local date window `window_start..=window_end` not covered
/// by `slots`. Empty when `window_start > window_end`.
pub fn get_reverse_time_slots(
    slots: &TimeSlots,
    window_start: NaiveDate,
    window_end: NaiveDate,
    tz: Tz,
) -> TimeSlots {
    TimeSlots::from_date_range(window_start, window_end, tz).difference(slots)
}

/// Grow every slot by buffer durations and re-merge.
///
/// `trail` is subtracted from each start and `lead` added to each end. For a
/// conflicting slot this means a booking's recovery time must not reach into
/// the conflict, and its preparation time must not start before the conflict
/// is over.
///
/// # Errors
/// Returns `EngineError::NegativeBuffer` if either duration is negative and
/// `EngineError::BufferOutOfRange` if an extended bound is not representable.
pub fn extend_timeslots(slots: &TimeSlots, lead: Duration, trail: Duration) -> Result<TimeSlots> {
    if lead < Duration::zero() || trail < Duration::zero() {
        return Err(EngineError::NegativeBuffer);
    }
    slots
        .iter()
        .map(|slot| {
            let start = slot.start().checked_sub_signed(trail);
            let end = slot.end().checked_add_signed(lead);
            match (start, end) {
                (Some(start), Some(end)) => Ok(TimeSlot::from_ordered(start, end)),
                _ => Err(EngineError::BufferOutOfRange),
            }
        })
        .collect()
}

/// The first slot of at least `min_duration`, if any.
pub fn find_first_free_slot(free: &TimeSlots, min_duration: Duration) -> Option<TimeSlot> {
    free.iter().find(|slot| slot.duration() >= min_duration).copied()
}
