//! Compact day-of-week sets.
//!
//! Each [`DayOfWeek`] is a distinct power-of-two flag (Monday = 1 … Sunday = 64),
//! so a [`DaysOfWeek`] set is just the bitwise OR of its members. Sets iterate
//! and render in canonical Monday → Sunday order regardless of how they were built.

use std::fmt;
use std::ops::{BitAnd, BitOr};

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum DayOfWeek {
    Monday = 1 << 0,
    Tuesday = 1 << 1,
    Wednesday = 1 << 2,
    Thursday = 1 << 3,
    Friday = 1 << 4,
    Saturday = 1 << 5,
    Sunday = 1 << 6,
}

impl DayOfWeek {
    /// All days in canonical order.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// ISO weekday number (1 = Monday, 7 = Sunday).
    pub const fn iso_weekday(self) -> u32 {
        self.bit().trailing_zeros() + 1
    }

    /// Inverse of [`DayOfWeek::iso_weekday`]. Returns `None` outside `1..=7`.
    pub fn from_iso_weekday(iso: u32) -> Option<Self> {
        match iso {
            1..=7 => Some(Self::ALL[(iso - 1) as usize]),
            _ => None,
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        Self::ALL[weekday.num_days_from_monday() as usize]
    }

    pub fn to_weekday(self) -> Weekday {
        match self {
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
            DayOfWeek::Sunday => Weekday::Sun,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }

    /// Two-letter RFC 5545 `BYDAY` code.
    pub fn ical_code(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "MO",
            DayOfWeek::Tuesday => "TU",
            DayOfWeek::Wednesday => "WE",
            DayOfWeek::Thursday => "TH",
            DayOfWeek::Friday => "FR",
            DayOfWeek::Saturday => "SA",
            DayOfWeek::Sunday => "SU",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A set of [`DayOfWeek`] flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DaysOfWeek(u8);

impl DaysOfWeek {
    const MASK: u8 = 0b111_1111;

    pub const fn empty() -> Self {
        Self(0)
    }

    /// The full week.
    pub const fn all() -> Self {
        Self(Self::MASK)
    }

    /// Build a set from a bitmask, ignoring bits that are not day flags.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    /// Build a set from a bitmask, rejecting bits that are not day flags.
    pub fn from_bits(bits: u8) -> Result<Self> {
        if bits & !Self::MASK != 0 {
            return Err(EngineError::InvalidDaysOfWeek(bits));
        }
        Ok(Self(bits))
    }

    /// The integer bitmask form.
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn contains(self, day: DayOfWeek) -> bool {
        self.0 & day.bit() != 0
    }

    pub fn contains_weekday(self, weekday: Weekday) -> bool {
        self.contains(DayOfWeek::from_weekday(weekday))
    }

    pub fn iter(self) -> impl Iterator<Item = DayOfWeek> {
        DayOfWeek::ALL.into_iter().filter(move |day| self.contains(*day))
    }

    /// Maximal runs of consecutive days as `(first, last)` pairs. Runs never
    /// wrap from Sunday back to Monday.
    pub fn runs(self) -> Vec<(DayOfWeek, DayOfWeek)> {
        let mut runs = Vec::new();
        let mut current: Option<(DayOfWeek, DayOfWeek)> = None;
        for day in DayOfWeek::ALL {
            if self.contains(day) {
                current = Some(match current {
                    Some((first, _)) => (first, day),
                    None => (day, day),
                });
            } else if let Some(run) = current.take() {
                runs.push(run);
            }
        }
        runs.extend(current);
        runs
    }
}

impl From<DayOfWeek> for DaysOfWeek {
    fn from(day: DayOfWeek) -> Self {
        Self(day.bit())
    }
}

impl From<DaysOfWeek> for u8 {
    fn from(days: DaysOfWeek) -> Self {
        days.0
    }
}

impl TryFrom<u8> for DaysOfWeek {
    type Error = EngineError;

    fn try_from(bits: u8) -> Result<Self> {
        Self::from_bits(bits)
    }
}

impl FromIterator<DayOfWeek> for DaysOfWeek {
    fn from_iter<I: IntoIterator<Item = DayOfWeek>>(iter: I) -> Self {
        Self(iter.into_iter().fold(0, |bits, day| bits | day.bit()))
    }
}

impl BitAnd for DaysOfWeek {
    type Output = DaysOfWeek;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for DaysOfWeek {
    type Output = DaysOfWeek;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for DaysOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .runs()
            .into_iter()
            .map(|(first, last)| {
                if first == last {
                    first.label().to_string()
                } else {
                    format!("{} - {}", first.label(), last.label())
                }
            })
            .collect();
        f.write_str(&english_list(&parts))
    }
}

/// Join items as an English list: `a`, `a and b`, `a, b, and c`.
pub(crate) fn english_list<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}
