//! Quantized time axis for a scheduling day.
//!
//! A [`Slot`] is a coordinate on the grid (minutes since midnight), not a
//! stored entity. Both the first and the last hour boundary are slots, so the
//! default 08:00 to 20:00 grid with a 15-minute step has 49 slots. A slot covers
//! `[value, value + step)`, which makes the window for a day end one step
//! after the last slot.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interval::{IntervalError, ensure_ordered};

pub const DEFAULT_DAY_START_HOUR: u32 = 8;
pub const DEFAULT_DAY_END_HOUR: u32 = 20;
pub const DEFAULT_STEP_MINUTES: u32 = 15;

const MINUTES_PER_HOUR: u32 = 60;

/// Invalid grid parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("day end hour {end} must be after day start hour {start}")]
    EmptyDay { start: u32, end: u32 },

    #[error("day end hour {0} must be at most 23")]
    EndOutOfRange(u32),

    #[error("step of {0} minutes must be non-zero and divide 60")]
    InvalidStep(u32),
}

/// A grid coordinate in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot(u32);

impl Slot {
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Display label, e.g. `09:45`.
    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}",
            self.0 / MINUTES_PER_HOUR,
            self.0 % MINUTES_PER_HOUR
        )
    }
}

/// Grid parameters for one scheduling day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGrid {
    day_start_hour: u32,
    day_end_hour: u32,
    step_minutes: u32,
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            day_start_hour: DEFAULT_DAY_START_HOUR,
            day_end_hour: DEFAULT_DAY_END_HOUR,
            step_minutes: DEFAULT_STEP_MINUTES,
        }
    }
}

impl SlotGrid {
    /// Creates a grid after validating its parameters.
    pub const fn new(
        day_start_hour: u32,
        day_end_hour: u32,
        step_minutes: u32,
    ) -> Result<Self, GridError> {
        if day_end_hour <= day_start_hour {
            return Err(GridError::EmptyDay {
                start: day_start_hour,
                end: day_end_hour,
            });
        }
        // The window closes one step after the last slot, which must stay
        // on the same calendar date.
        if day_end_hour > 23 {
            return Err(GridError::EndOutOfRange(day_end_hour));
        }
        if step_minutes == 0 || MINUTES_PER_HOUR % step_minutes != 0 {
            return Err(GridError::InvalidStep(step_minutes));
        }
        Ok(Self {
            day_start_hour,
            day_end_hour,
            step_minutes,
        })
    }

    pub const fn step_minutes(&self) -> u32 {
        self.step_minutes
    }

    pub const fn first_slot(&self) -> Slot {
        Slot(self.day_start_hour * MINUTES_PER_HOUR)
    }

    pub const fn last_slot(&self) -> Slot {
        Slot(self.day_end_hour * MINUTES_PER_HOUR)
    }

    pub const fn slot_count(&self) -> u32 {
        (self.last_slot().0 - self.first_slot().0) / self.step_minutes + 1
    }

    /// All slots in ascending order.
    pub fn slots(&self) -> Vec<Slot> {
        (self.first_slot().0..=self.last_slot().0)
            .step_by(self.step_minutes as usize)
            .map(Slot)
            .collect()
    }

    /// Returns the slot at `value` if it lies on the grid.
    pub const fn slot(&self, value: u32) -> Option<Slot> {
        if value < self.first_slot().0
            || value > self.last_slot().0
            || value % self.step_minutes != 0
        {
            return None;
        }
        Some(Slot(value))
    }

    pub const fn contains(&self, value: u32) -> bool {
        self.slot(value).is_some()
    }

    /// Absolute instant of a slot on `date`.
    pub fn slot_to_instant(&self, date: NaiveDate, value: u32) -> DateTime<Utc> {
        slot_to_instant(date, value)
    }

    /// Inverse of [`slot_to_instant`](Self::slot_to_instant).
    ///
    /// Returns `None` for instants that are off-grid or carry seconds.
    pub fn instant_to_slot(&self, instant: DateTime<Utc>) -> Option<Slot> {
        let time = instant.time();
        if time.second() != 0 || time.nanosecond() != 0 {
            return None;
        }
        self.slot(time.hour() * MINUTES_PER_HOUR + time.minute())
    }

    /// The one-step micro interval covered by a slot.
    pub fn slot_span(&self, date: NaiveDate, value: u32) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = slot_to_instant(date, value);
        (start, start + self.step())
    }

    /// Half-open bounds of the display window on `date`.
    pub fn window(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = slot_to_instant(date, self.first_slot().0);
        let end = slot_to_instant(date, self.last_slot().0) + self.step();
        (start, end)
    }

    /// Checks that `[start, end)` is non-empty, grid-aligned and inside the
    /// display window of the day it starts on.
    pub fn validate_interval(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), IntervalError> {
        ensure_ordered(start, end)?;
        for instant in [start, end] {
            if !self.is_aligned(instant) {
                return Err(IntervalError::Misaligned {
                    instant,
                    step_minutes: self.step_minutes,
                });
            }
        }
        let (window_start, window_end) = self.window(start.date_naive());
        if start < window_start || end > window_end {
            return Err(IntervalError::OutsideWindow {
                start,
                end,
                window_start,
                window_end,
            });
        }
        Ok(())
    }

    fn is_aligned(&self, instant: DateTime<Utc>) -> bool {
        let time = instant.time();
        time.second() == 0 && time.nanosecond() == 0 && time.minute() % self.step_minutes == 0
    }

    fn step(&self) -> Duration {
        Duration::minutes(i64::from(self.step_minutes))
    }
}

/// Enumerates the slots for a day.
pub fn generate_slots(
    day_start_hour: u32,
    day_end_hour: u32,
    step_minutes: u32,
) -> Result<Vec<Slot>, GridError> {
    Ok(SlotGrid::new(day_start_hour, day_end_hour, step_minutes)?.slots())
}

/// Absolute UTC instant `value` minutes after midnight on `date`.
pub fn slot_to_instant(date: NaiveDate, value: u32) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc() + Duration::minutes(i64::from(value))
}
