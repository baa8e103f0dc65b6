//! Schedulable resources, bookings and the bookable variant being resolved.
//!
//! These are plain records handed in by the caller; nothing here is loaded or
//! persisted by the engine.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::timeslot::{window_slot, TimeSlot};
use crate::weekly::WeeklyTimes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceGroupId(pub u64);

impl fmt::Display for ResourceGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group #{}", self.0)
    }
}

/// A staff member, room or piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    /// When the resource can be booked. `None` means always; an empty set of
    /// rules means never.
    #[serde(default)]
    pub availability: Option<WeeklyTimes>,
}

impl Resource {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            name: String::new(),
            availability: None,
        }
    }

    pub fn with_availability(mut self, availability: WeeklyTimes) -> Self {
        self.availability = Some(availability);
        self
    }

    pub fn weekly_times(&self) -> WeeklyTimes {
        self.availability.clone().unwrap_or_else(WeeklyTimes::unlimited)
    }
}

/// Interchangeable resources; any one member satisfies a demand on the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub id: ResourceGroupId,
    #[serde(default)]
    pub name: String,
    pub resources: BTreeSet<ResourceId>,
}

/// An existing booking on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Setup time claimed before `start`.
    #[serde(rename = "preparation_minutes", with = "minutes", default)]
    pub preparation_time: Duration,
    /// Teardown time claimed after `end`.
    #[serde(rename = "recovery_minutes", with = "minutes", default)]
    pub recovery_time: Duration,
    #[serde(default)]
    pub blocks_all_resources: bool,
    #[serde(default)]
    pub resources: Vec<ResourceId>,
    #[serde(default)]
    pub resource_groups: Vec<ResourceGroupId>,
    #[serde(default)]
    pub is_canceled: bool,
}

impl CalendarEvent {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            preparation_time: Duration::zero(),
            recovery_time: Duration::zero(),
            blocks_all_resources: false,
            resources: Vec::new(),
            resource_groups: Vec::new(),
            is_canceled: false,
        }
    }

    /// An event spanning whole local days, from midnight of `start_date` to
    /// midnight after `end_date`.
    pub fn all_day(start_date: NaiveDate, end_date: NaiveDate, tz: Tz) -> Result<Self> {
        let slot = window_slot(start_date, end_date, tz).ok_or(EngineError::InvalidInterval {
            start: crate::dst::local_midnight(start_date, tz),
            end: crate::dst::local_midnight(end_date, tz),
        })?;
        Ok(Self::new(slot.start(), slot.end()))
    }

    /// The span the event occupies including its own setup and teardown.
    pub fn effective_timeslot(&self) -> Result<TimeSlot> {
        let start = self
            .start
            .checked_sub_signed(self.preparation_time)
            .ok_or(EngineError::BufferOutOfRange)?;
        let end = self
            .end
            .checked_add_signed(self.recovery_time)
            .ok_or(EngineError::BufferOutOfRange)?;
        TimeSlot::new(start, end)
    }

    /// Whether the event occupies any of `ids`, directly or through a group.
    /// Groups missing from `ctx` are ignored here.
    pub fn occupies_any(&self, ctx: &BookingContext, ids: &BTreeSet<ResourceId>) -> bool {
        self.resources.iter().any(|id| ids.contains(id))
            || self
                .resource_groups
                .iter()
                .filter_map(|id| ctx.resource_group(*id).ok())
                .any(|group| !group.resources.is_disjoint(ids))
    }

    /// One demand per directly booked resource, one per booked group.
    pub fn requirement_sets(&self, ctx: &BookingContext) -> Result<Vec<BTreeSet<ResourceId>>> {
        demands(&self.resources, &self.resource_groups, ctx)
    }
}

/// Something a customer can book: it needs resources and buffers of its own.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BookableVariant {
    #[serde(default)]
    pub required_resources: Vec<ResourceId>,
    #[serde(default)]
    pub required_resource_groups: Vec<ResourceGroupId>,
    #[serde(rename = "preparation_minutes", with = "minutes", default)]
    pub preparation_time: Duration,
    #[serde(rename = "recovery_minutes", with = "minutes", default)]
    pub recovery_time: Duration,
    /// The activity's own schedule. Only its date bounds restrict booking.
    #[serde(default)]
    pub weekly_times: WeeklyTimes,
}

impl BookableVariant {
    /// Earliest bookable date: the schedule's earliest bounded start, never
    /// before `today`.
    pub fn min_start_date(&self, today: NaiveDate) -> NaiveDate {
        self.weekly_times
            .iter()
            .filter_map(|wt| wt.start_date)
            .min()
            .map_or(today, |earliest| earliest.max(today))
    }

    /// Latest bookable date, `None` when no rule bounds its end.
    pub fn max_end_date(&self) -> Option<NaiveDate> {
        self.weekly_times.iter().filter_map(|wt| wt.end_date).max()
    }

    pub fn business_hours(&self) -> WeeklyTimes {
        if self.weekly_times.is_empty() {
            WeeklyTimes::unlimited()
        } else {
            self.weekly_times.clone()
        }
    }

    /// One demand per required resource, one per required group.
    pub fn requirement_sets(&self, ctx: &BookingContext) -> Result<Vec<BTreeSet<ResourceId>>> {
        demands(&self.required_resources, &self.required_resource_groups, ctx)
    }
}

/// Everything the resolver reads besides the variant itself.
#[derive(Debug, Clone)]
pub struct BookingContext {
    pub timezone: Tz,
    /// The current local date; nothing before it is bookable.
    pub today: NaiveDate,
    pub resources: Vec<Resource>,
    pub resource_groups: Vec<ResourceGroup>,
    pub calendar_events: Vec<CalendarEvent>,
}

impl BookingContext {
    pub fn new(timezone: Tz, today: NaiveDate) -> Self {
        Self {
            timezone,
            today,
            resources: Vec::new(),
            resource_groups: Vec::new(),
            calendar_events: Vec::new(),
        }
    }

    pub fn resource(&self, id: ResourceId) -> Result<&Resource> {
        self.resources
            .iter()
            .find(|r| r.id == id)
            .ok_or(EngineError::UnknownResource(id))
    }

    pub fn resource_group(&self, id: ResourceGroupId) -> Result<&ResourceGroup> {
        self.resource_groups
            .iter()
            .find(|g| g.id == id)
            .ok_or(EngineError::UnknownResourceGroup(id))
    }
}

fn demands(
    resources: &[ResourceId],
    groups: &[ResourceGroupId],
    ctx: &BookingContext,
) -> Result<Vec<BTreeSet<ResourceId>>> {
    let direct = resources.iter().map(|id| BTreeSet::from([*id]));
    let grouped = groups
        .iter()
        .map(|id| ctx.resource_group(*id).map(|g| g.resources.clone()))
        .collect::<Result<Vec<_>>>()?;
    Ok(direct.chain(grouped).collect())
}

/// Parse an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| EngineError::InvalidTimezone(name.to_string()))
}

/// (De)serialize a duration as whole minutes.
mod minutes {
    use chrono::Duration;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(duration.num_minutes())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let minutes = i64::deserialize(deserializer)?;
        Duration::try_minutes(minutes)
            .ok_or_else(|| D::Error::custom(format!("{minutes} minutes is out of range")))
    }
}
