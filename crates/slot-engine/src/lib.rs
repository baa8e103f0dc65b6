//! # slot-engine
//!
//! Resource availability and booking-conflict engine.
//!
//! Given recurring weekly availability rules for schedulable resources (staff,
//! rooms, equipment), existing bookings and setup/teardown buffers, the engine
//! computes exactly which time a new booking cannot occupy, and therefore
//! which time is still bookable. Everything is a pure function over immutable
//! values; there is no I/O and no shared state.
//!
//! ## Modules
//!
//! - [`weekday`] — `DayOfWeek` flags and `DaysOfWeek` bit-sets
//! - [`weekly`] — recurring `WeeklyTime` rules and their intersection
//! - [`timeslot`] — `TimeSlot` / normalized `TimeSlots` interval algebra
//! - [`conflict`] — demand overlay and unresolvable-interval detection
//! - [`matching`] — distinct-resource feasibility (backtracking, Hopcroft–Karp)
//! - [`expander`] — weekly rules → concrete time slots in a date window
//! - [`freebusy`] — complements, buffer extension, first-fit search
//! - [`dst`] — DST gap/overlap policies for local wall-clock times
//! - [`resources`] — resources, groups, bookings and bookable variants
//! - [`availability`] — the variant-level resolver
//! - [`error`] — Error types

pub mod availability;
pub mod conflict;
pub mod dst;
pub mod error;
pub mod expander;
pub mod freebusy;
pub mod matching;
pub mod resources;
pub mod timeslot;
pub mod weekday;
pub mod weekly;

pub use availability::{available_timeslots, check_booking, conflicting_timeslots, first_available_slot};
pub use conflict::{flatten_events, get_conflicting_timeslots, SimpleEvent};
pub use dst::DstPolicy;
pub use error::EngineError;
pub use expander::get_time_slots_by_weekly_times;
pub use freebusy::{extend_timeslots, get_reverse_time_slots};
pub use matching::has_resolvable_resource_groups;
pub use resources::{
    parse_timezone, BookableVariant, BookingContext, CalendarEvent, Resource, ResourceGroup,
    ResourceGroupId, ResourceId,
};
pub use timeslot::{TimeSlot, TimeSlots};
pub use weekday::{DayOfWeek, DaysOfWeek};
pub use weekly::{EndTime, WeeklyTime, WeeklyTimes};
