//! When can a bookable variant be booked?
//!
//! The resolver gathers every demand that competes for the variant's
//! resources over a date range (the variant's own demand, each resource's
//! off-hours, existing bookings) and overlays them. Wherever the demands
//! cannot be met by distinct resources the variant is blocked; its own buffer
//! durations then widen those blocks. Available time is what remains.

use std::collections::BTreeSet;

use chrono::{Days, Duration, NaiveDate};

use crate::conflict::{get_conflicting_timeslots, SimpleEvent};
use crate::error::{EngineError, Result};
use crate::expander::get_time_slots_by_weekly_times;
use crate::freebusy::{extend_timeslots, find_first_free_slot, get_reverse_time_slots};
use crate::resources::{BookableVariant, BookingContext, ResourceId};
use crate::timeslot::{window_slot, TimeSlot, TimeSlots};

/// Time between `start_date` and `end_date` (inclusive local dates) during
/// which `variant` cannot be booked.
///
/// Days outside the variant's own min-start/max-end bounds are blocked whole.
/// Conflicts are widened by the variant's preparation and recovery times, so
/// the result may reach past the requested range.
///
/// # Errors
/// Returns `EngineError::UnknownResource`/`UnknownResourceGroup` when the
/// variant or a relevant booking references ids missing from `ctx`, and any
/// error raised while expanding resource availability.
pub fn conflicting_timeslots(
    variant: &BookableVariant,
    ctx: &BookingContext,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<TimeSlots> {
    let tz = ctx.timezone;
    if start_date > end_date {
        return Ok(TimeSlots::default());
    }

    let min_start = variant.min_start_date(ctx.today);
    let max_end = variant.max_end_date();
    if min_start > end_date || max_end.is_some_and(|max| max < start_date) {
        return Ok(TimeSlots::from_date_range(start_date, end_date, tz));
    }

    // Clip the range to the variant's bounds; clipped days are blocked whole.
    let mut out_of_bounds = TimeSlots::default();
    let (mut start, mut end) = (start_date, end_date);
    if min_start > start {
        if let Some(day_before) = min_start.pred_opt() {
            out_of_bounds = out_of_bounds.union(&TimeSlots::from_date_range(start, day_before, tz));
        }
        start = min_start;
    }
    if let Some(max) = max_end.filter(|max| *max < end) {
        if let Some(day_after) = max.succ_opt() {
            out_of_bounds = out_of_bounds.union(&TimeSlots::from_date_range(day_after, end, tz));
        }
        end = max;
    }
    let Some(window) = window_slot(start, end, tz) else {
        return Ok(out_of_bounds);
    };

    let demand = variant.requirement_sets(ctx)?;
    let candidates: BTreeSet<ResourceId> = demand.iter().flatten().copied().collect();
    let mut events = vec![SimpleEvent::new(window, demand)];

    for id in &candidates {
        let resource = ctx.resource(*id)?;
        let available = get_time_slots_by_weekly_times(&resource.weekly_times(), start, end, tz)?;
        events.extend(
            get_reverse_time_slots(&available, start, end, tz)
                .into_iter()
                .map(|gap| SimpleEvent::single(gap, *id)),
        );
    }

    for booking in ctx.calendar_events.iter().filter(|e| !e.is_canceled) {
        let slot = booking.effective_timeslot()?;
        if !slot.overlaps(&window) {
            continue;
        }
        if booking.blocks_all_resources {
            events.push(SimpleEvent::blocking(slot));
            continue;
        }
        if booking.occupies_any(ctx, &candidates) {
            events.push(SimpleEvent::new(slot, booking.requirement_sets(ctx)?));
        }
    }

    let conflicts = TimeSlots::new(get_conflicting_timeslots(&events)).union(&out_of_bounds);
    tracing::debug!(
        %start,
        %end,
        resources = candidates.len(),
        events = events.len(),
        conflicts = conflicts.len(),
        "resolved variant conflicts"
    );

    extend_timeslots(&conflicts, variant.preparation_time, variant.recovery_time)
}

/// Time between `start_date` and `end_date` during which `variant` can be
/// booked: the complement of [`conflicting_timeslots`] over that range.
pub fn available_timeslots(
    variant: &BookableVariant,
    ctx: &BookingContext,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<TimeSlots> {
    let conflicts = conflicting_timeslots(variant, ctx, start_date, end_date)?;
    Ok(get_reverse_time_slots(&conflicts, start_date, end_date, ctx.timezone))
}

/// Whether `requested` fits entirely inside time the variant is available.
pub fn check_booking(
    variant: &BookableVariant,
    ctx: &BookingContext,
    requested: &TimeSlot,
) -> Result<bool> {
    let tz = ctx.timezone;
    let first_day = requested.start().with_timezone(&tz).date_naive();
    // The end is exclusive; a booking ending at midnight does not touch the next day.
    let last_day = (requested.end() - Duration::nanoseconds(1))
        .with_timezone(&tz)
        .date_naive();

    // Conflicts on neighbouring days reach the request through the variant's
    // buffers: preparation pushes earlier conflicts forward, recovery pulls
    // later ones back.
    let from = first_day
        .checked_sub_days(Days::new(whole_days(variant.preparation_time)))
        .ok_or(EngineError::BufferOutOfRange)?;
    let to = last_day
        .checked_add_days(Days::new(whole_days(variant.recovery_time)))
        .ok_or(EngineError::BufferOutOfRange)?;

    let available = available_timeslots(variant, ctx, from, to)?;
    let fits = available.contains(requested);
    tracing::debug!(start = %requested.start(), end = %requested.end(), fits, "checked booking");
    Ok(fits)
}

/// Days needed to cover `buffer`, rounded up. Negative buffers count as none.
fn whole_days(buffer: Duration) -> u64 {
    let days = buffer.num_days();
    let partial = buffer > Duration::days(days);
    u64::try_from(days + i64::from(partial)).unwrap_or(0)
}

/// The first available slot of at least `min_duration` in the range.
pub fn first_available_slot(
    variant: &BookableVariant,
    ctx: &BookingContext,
    start_date: NaiveDate,
    end_date: NaiveDate,
    min_duration: Duration,
) -> Result<Option<TimeSlot>> {
    let available = available_timeslots(variant, ctx, start_date, end_date)?;
    Ok(find_first_free_slot(&available, min_duration))
}
