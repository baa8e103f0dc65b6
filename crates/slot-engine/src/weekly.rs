//! Recurring weekly availability rules and their intersection algebra.
//!
//! A [`WeeklyTime`] describes "these days of the week, between these two
//! wall-clock times, optionally only between these two dates". Intersecting two
//! rules yields the rule describing the time both cover; a result that covers
//! nothing is reported as `None` rather than as an error.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::weekday::{english_list, DaysOfWeek};

/// End of a daily time range.
///
/// `EndOfDay` sorts after every wall-clock time, so a range ending at
/// `EndOfDay` runs until midnight of the following date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EndTime {
    /// A wall-clock end. Midnight belongs in `EndOfDay`; build values from
    /// raw times with [`EndTime::from_wall_clock`].
    At(NaiveTime),
    EndOfDay,
}

impl EndTime {
    /// Interpret a raw wall-clock value where midnight means "end of day".
    pub fn from_wall_clock(time: NaiveTime) -> Self {
        if time == NaiveTime::MIN {
            EndTime::EndOfDay
        } else {
            EndTime::At(time)
        }
    }

    /// Fold `At(00:00)` into `EndOfDay`.
    pub fn normalized(self) -> Self {
        match self {
            EndTime::At(time) => Self::from_wall_clock(time),
            EndTime::EndOfDay => EndTime::EndOfDay,
        }
    }

    pub fn is_end_of_day(self) -> bool {
        self == EndTime::EndOfDay
    }

    /// Whether a range starting at `start` and ending here covers any time.
    pub fn is_after(self, start: NaiveTime) -> bool {
        match self {
            EndTime::At(end) => start < end,
            EndTime::EndOfDay => true,
        }
    }
}

impl Ord for EndTime {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (EndTime::At(a), EndTime::At(b)) => a.cmp(b),
            (EndTime::At(_), EndTime::EndOfDay) => Ordering::Less,
            (EndTime::EndOfDay, EndTime::At(_)) => Ordering::Greater,
            (EndTime::EndOfDay, EndTime::EndOfDay) => Ordering::Equal,
        }
    }
}

impl PartialOrd for EndTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<NaiveTime> for EndTime {
    fn from(time: NaiveTime) -> Self {
        Self::from_wall_clock(time)
    }
}

impl fmt::Display for EndTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndTime::At(time) if time.second() != 0 => write!(f, "{}", time.format("%H:%M:%S")),
            EndTime::At(time) => write!(f, "{}", time.format("%H:%M")),
            EndTime::EndOfDay => f.write_str("24:00"),
        }
    }
}

impl TryFrom<String> for EndTime {
    type Error = EngineError;

    fn try_from(text: String) -> Result<Self> {
        text.parse()
    }
}

impl std::str::FromStr for EndTime {
    type Err = EngineError;

    fn from_str(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if matches!(trimmed, "24:00" | "24:00:00") {
            return Ok(EndTime::EndOfDay);
        }
        NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map(EndTime::from_wall_clock)
            .map_err(|_| EngineError::InvalidEndTime(text.to_string()))
    }
}

impl From<EndTime> for String {
    fn from(end: EndTime) -> Self {
        end.to_string()
    }
}

/// One recurring weekly rule bound to an optional date range.
///
/// `start_date`/`end_date` are inclusive; `None` leaves that side unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeeklyTime {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub days_of_week: DaysOfWeek,
    pub start_time: NaiveTime,
    pub end_time: EndTime,
}

impl WeeklyTime {
    pub fn new(days_of_week: DaysOfWeek, start_time: NaiveTime, end_time: EndTime) -> Self {
        Self {
            start_date: None,
            end_date: None,
            days_of_week,
            start_time,
            end_time: end_time.normalized(),
        }
    }

    /// Restrict the rule to an inclusive date range.
    pub fn between(mut self, start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    /// Every day, all day, forever.
    pub fn unlimited() -> Self {
        Self::new(DaysOfWeek::all(), NaiveTime::MIN, EndTime::EndOfDay)
    }

    /// A rule is valid when it covers at least one instant.
    pub fn is_valid(&self) -> bool {
        if self.days_of_week.is_empty() {
            return false;
        }
        if !self.end_time.is_after(self.start_time) {
            return false;
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return false;
            }
        }
        true
    }

    /// The rule covering exactly the time both rules cover, without checking
    /// validity. Use [`WeeklyTime::intersect`] unless the raw value is needed.
    pub fn intersection(&self, other: &WeeklyTime) -> WeeklyTime {
        WeeklyTime {
            start_date: later_start(self.start_date, other.start_date),
            end_date: earlier_end(self.end_date, other.end_date),
            days_of_week: self.days_of_week & other.days_of_week,
            start_time: self.start_time.max(other.start_time),
            end_time: self.end_time.min(other.end_time),
        }
    }

    /// Intersect two rules. `None` means they share no time.
    pub fn intersect(&self, other: &WeeklyTime) -> Option<WeeklyTime> {
        Some(self.intersection(other)).filter(WeeklyTime::is_valid)
    }
}

fn later_start(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn earlier_end(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

impl fmt::Display for WeeklyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} - {}",
            self.days_of_week,
            self.start_time.format("%H:%M"),
            self.end_time
        )
    }
}

/// An ordered collection of weekly rules.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyTimes(Vec<WeeklyTime>);

impl WeeklyTimes {
    pub fn new(rules: Vec<WeeklyTime>) -> Self {
        Self(rules)
    }

    pub fn unlimited() -> Self {
        Self(vec![WeeklyTime::unlimited()])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WeeklyTime> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[WeeklyTime] {
        &self.0
    }

    /// Pairwise intersection of every rule in `self` with every rule in
    /// `other`, keeping only results that cover some time.
    pub fn intersect(&self, other: &WeeklyTimes) -> WeeklyTimes {
        self.0
            .iter()
            .flat_map(|a| other.0.iter().filter_map(move |b| a.intersect(b)))
            .collect()
    }
}

impl FromIterator<WeeklyTime> for WeeklyTimes {
    fn from_iter<I: IntoIterator<Item = WeeklyTime>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for WeeklyTimes {
    type Item = WeeklyTime;
    type IntoIter = std::vec::IntoIter<WeeklyTime>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a WeeklyTimes {
    type Item = &'a WeeklyTime;
    type IntoIter = std::slice::Iter<'a, WeeklyTime>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for WeeklyTimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&english_list(&parts))
    }
}
