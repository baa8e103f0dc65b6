//! Resolution of local wall-clock times that DST transitions make ambiguous or
//! nonexistent.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// Policy for recurrence slots whose wall-clock bounds fall in a DST gap.
///
/// Ambiguous times (the repeated hour when clocks go back) always resolve to
/// the earlier instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstPolicy {
    /// Drop slots with a bound that does not exist on that date.
    Skip,
    /// Read the nonexistent time with the offset in force before the gap,
    /// which lands just as far past the transition as the gap is long.
    #[default]
    ShiftForward,
}

/// Resolve a local wall-clock time in `tz`. `None` only under [`DstPolicy::Skip`].
pub fn resolve_local(local: NaiveDateTime, tz: Tz, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => Some(shift_past_gap(local, tz)),
        },
    }
}

fn shift_past_gap(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    // Transitions are far more than a day apart, so the offset a day earlier
    // is the one in force right before the gap.
    let before_gap = local - Duration::days(1);
    let offset = tz.offset_from_utc_datetime(&before_gap).fix();
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&utc)
}

/// The instant local midnight begins `date` in `tz`.
pub(crate) fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    local_instant(date, NaiveTime::MIN, tz)
}

/// Resolve a local date and time, shifting forward out of any DST gap.
pub(crate) fn local_instant(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let local = date.and_time(time);
    match resolve_local(local, tz, DstPolicy::ShiftForward) {
        Some(instant) => instant,
        None => shift_past_gap(local, tz),
    }
}
