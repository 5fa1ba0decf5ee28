//! Stored showing windows.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{PropertyId, ShowingId};

/// Errors for malformed interval bounds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntervalError {
    /// The interval is empty or reversed.
    #[error("interval start {start} must be before end {end}")]
    EmptyRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A bound does not fall on a grid boundary.
    #[error("{instant} is not aligned to the {step_minutes}-minute grid")]
    Misaligned {
        instant: DateTime<Utc>,
        step_minutes: u32,
    },

    /// The interval leaves the configured display window for its day.
    #[error("interval {start} to {end} is outside the display window {window_start} to {window_end}")]
    OutsideWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    },
}

/// A half-open `[start_time, end_time)` window during which a property is
/// open for showings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowingInterval {
    /// Store-assigned identifier.
    pub id: ShowingId,
    /// The property this window belongs to.
    pub property_id: PropertyId,
    /// Inclusive start.
    pub start_time: DateTime<Utc>,
    /// Exclusive end.
    pub end_time: DateTime<Utc>,
}

impl ShowingInterval {
    /// Creates an interval, rejecting empty or reversed ranges.
    pub fn new(
        id: ShowingId,
        property_id: PropertyId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Self, IntervalError> {
        ensure_ordered(start_time, end_time)?;
        Ok(Self {
            id,
            property_id,
            start_time,
            end_time,
        })
    }

    /// Calendar date (UTC) the window starts on.
    pub fn date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Whether this window ends exactly where `other` begins.
    pub fn touches(&self, other: &Self) -> bool {
        self.end_time == other.start_time
    }
}

/// Rejects `start >= end`.
pub fn ensure_ordered(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), IntervalError> {
    if start >= end {
        return Err(IntervalError::EmptyRange { start, end });
    }
    Ok(())
}
