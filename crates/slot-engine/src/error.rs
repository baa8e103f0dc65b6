//! Error types for slot-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::resources::{ResourceGroupId, ResourceId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A time slot must have a strictly positive duration.
    #[error("Invalid interval: start {start} is not before end {end}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid days-of-week bitmask: {0:#09b}")]
    InvalidDaysOfWeek(u8),

    #[error("Invalid end time: {0}")]
    InvalidEndTime(String),

    #[error("Recurrence error: {0}")]
    Recurrence(String),

    #[error("Expansion window of {days} days exceeds the supported maximum")]
    WindowTooLarge { days: i64 },

    #[error("Buffer durations must not be negative")]
    NegativeBuffer,

    #[error("Buffer duration reaches outside the representable time range")]
    BufferOutOfRange,

    #[error("Unknown resource: {0}")]
    UnknownResource(ResourceId),

    #[error("Unknown resource group: {0}")]
    UnknownResourceGroup(ResourceGroupId),
}

pub type Result<T> = std::result::Result<T, EngineError>;
