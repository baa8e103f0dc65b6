//! Concrete half-open time intervals and normalized interval collections.
//!
//! A [`TimeSlot`] is `[start, end)` with `start < end`. A [`TimeSlots`] value is
//! always normalized: sorted by start, with overlapping *and* touching slots
//! merged, so two equal sets of covered instants compare equal.

use std::ops::{BitAnd, BitOr, Sub};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::local_midnight;
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSlot")]
pub struct TimeSlot {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawTimeSlot {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawTimeSlot> for TimeSlot {
    type Error = EngineError;

    fn try_from(raw: RawTimeSlot) -> Result<Self> {
        TimeSlot::new(raw.start, raw.end)
    }
}

impl TimeSlot {
    /// Create a slot, failing with [`EngineError::InvalidInterval`] unless
    /// `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(EngineError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Callers must already have established `start < end`.
    pub(crate) fn from_ordered(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(start < end, "time slot {start} .. {end} is empty");
        Self { start, end }
    }

    /// `Some` only when the bounds describe a non-empty interval.
    pub(crate) fn non_empty(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether the two slots share at least one instant. Touching slots do not.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely within this slot.
    pub fn contains(&self, other: &TimeSlot) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The overlapping part, if any.
    pub fn intersection(&self, other: &TimeSlot) -> TimeSlots {
        TimeSlots::from_normalized(
            Self::non_empty(self.start.max(other.start), self.end.min(other.end))
                .into_iter()
                .collect(),
        )
    }

    pub fn union(&self, other: &TimeSlot) -> TimeSlots {
        TimeSlots::new([*self, *other])
    }

    /// The parts of this slot not covered by `other`: zero, one or two slots.
    pub fn difference(&self, other: &TimeSlot) -> TimeSlots {
        if !self.overlaps(other) {
            return TimeSlots::from_normalized(vec![*self]);
        }
        let head = Self::non_empty(self.start, other.start);
        let tail = Self::non_empty(other.end, self.end);
        TimeSlots::from_normalized(head.into_iter().chain(tail).collect())
    }

    /// The parts of this slot not covered by any slot of `others`.
    pub fn difference_all(&self, others: &TimeSlots) -> TimeSlots {
        TimeSlots::from_normalized(vec![*self]).difference(others)
    }
}

impl BitAnd for &TimeSlot {
    type Output = TimeSlots;

    fn bitand(self, rhs: Self) -> TimeSlots {
        self.intersection(rhs)
    }
}

impl BitOr for &TimeSlot {
    type Output = TimeSlots;

    fn bitor(self, rhs: Self) -> TimeSlots {
        self.union(rhs)
    }
}

impl Sub for &TimeSlot {
    type Output = TimeSlots;

    fn sub(self, rhs: Self) -> TimeSlots {
        self.difference(rhs)
    }
}

impl Sub<&TimeSlots> for &TimeSlot {
    type Output = TimeSlots;

    fn sub(self, rhs: &TimeSlots) -> TimeSlots {
        self.difference_all(rhs)
    }
}

/// A normalized set of time slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TimeSlot>", into = "Vec<TimeSlot>")]
pub struct TimeSlots(Vec<TimeSlot>);

impl TimeSlots {
    /// Sort and merge the given slots. Slots that touch are merged too.
    pub fn new<I: IntoIterator<Item = TimeSlot>>(slots: I) -> Self {
        let mut sorted: Vec<TimeSlot> = slots.into_iter().collect();
        sorted.sort_unstable();

        let mut merged: Vec<TimeSlot> = Vec::with_capacity(sorted.len());
        for slot in sorted {
            if let Some(last) = merged.last_mut() {
                if slot.start <= last.end {
                    last.end = last.end.max(slot.end);
                    continue;
                }
            }
            merged.push(slot);
        }
        Self(merged)
    }

    /// Wrap slots the caller already knows to be sorted, disjoint and
    /// non-touching.
    fn from_normalized(slots: Vec<TimeSlot>) -> Self {
        debug_assert!(slots.windows(2).all(|w| w[0].end < w[1].start));
        Self(slots)
    }

    /// One slot from local midnight of `start_date` to local midnight after
    /// `end_date`. Empty when `start_date > end_date`.
    pub fn from_date_range(start_date: NaiveDate, end_date: NaiveDate, tz: Tz) -> Self {
        Self(window_slot(start_date, end_date, tz).into_iter().collect())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeSlot> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[TimeSlot] {
        &self.0
    }

    pub fn first(&self) -> Option<&TimeSlot> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&TimeSlot> {
        self.0.last()
    }

    /// Whether `slot` lies entirely within one slot of this set.
    pub fn contains(&self, slot: &TimeSlot) -> bool {
        self.0.iter().any(|s| s.contains(slot))
    }

    pub fn total_duration(&self) -> Duration {
        self.0.iter().map(TimeSlot::duration).sum()
    }

    pub fn intersection(&self, other: &TimeSlots) -> TimeSlots {
        TimeSlots::new(
            self.0
                .iter()
                .flat_map(|a| other.0.iter().flat_map(move |b| a.intersection(b))),
        )
    }

    pub fn union(&self, other: &TimeSlots) -> TimeSlots {
        TimeSlots::new(self.0.iter().chain(other.0.iter()).copied())
    }

    /// Remove a single slot from every member.
    pub fn difference_slot(&self, other: &TimeSlot) -> TimeSlots {
        TimeSlots::new(self.0.iter().flat_map(|slot| slot.difference(other)))
    }

    /// Remove every slot of `other` in turn.
    pub fn difference(&self, other: &TimeSlots) -> TimeSlots {
        other
            .0
            .iter()
            .fold(self.clone(), |remaining, slot| remaining.difference_slot(slot))
    }
}

/// The single slot spanning the given inclusive local date range.
pub(crate) fn window_slot(start_date: NaiveDate, end_date: NaiveDate, tz: Tz) -> Option<TimeSlot> {
    if start_date > end_date {
        return None;
    }
    let start = local_midnight(start_date, tz);
    let end = local_midnight(end_date.succ_opt()?, tz);
    TimeSlot::non_empty(start, end)
}

impl From<Vec<TimeSlot>> for TimeSlots {
    fn from(slots: Vec<TimeSlot>) -> Self {
        Self::new(slots)
    }
}

impl From<TimeSlot> for TimeSlots {
    fn from(slot: TimeSlot) -> Self {
        Self(vec![slot])
    }
}

impl From<TimeSlots> for Vec<TimeSlot> {
    fn from(slots: TimeSlots) -> Self {
        slots.0
    }
}

impl FromIterator<TimeSlot> for TimeSlots {
    fn from_iter<I: IntoIterator<Item = TimeSlot>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl IntoIterator for TimeSlots {
    type Item = TimeSlot;
    type IntoIter = std::vec::IntoIter<TimeSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TimeSlots {
    type Item = &'a TimeSlot;
    type IntoIter = std::slice::Iter<'a, TimeSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl BitAnd for &TimeSlots {
    type Output = TimeSlots;

    fn bitand(self, rhs: Self) -> TimeSlots {
        self.intersection(rhs)
    }
}

impl BitOr for &TimeSlots {
    type Output = TimeSlots;

    fn bitor(self, rhs: Self) -> TimeSlots {
        self.union(rhs)
    }
}

impl Sub for &TimeSlots {
    type Output = TimeSlots;

    fn sub(self, rhs: Self) -> TimeSlots {
        self.difference(rhs)
    }
}

impl Sub<&TimeSlot> for &TimeSlots {
    type Output = TimeSlots;

    fn sub(self, rhs: &TimeSlot) -> TimeSlots {
        self.difference_slot(rhs)
    }
}
