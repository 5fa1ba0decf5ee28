//! Core domain logic for showing-availability scheduling.
//!
//! This crate contains the fundamental types and logic for:
//! - Slot grid: the quantized time axis of a scheduling day
//! - Conflict detection: half-open overlap tests per property
//! - Coalescing: planning merges of touching windows
//! - Selection: the drag-selection state machine
//! - Week window: Sunday-anchored calendar paging

pub mod coalesce;
pub mod conflict;
pub mod directory;
pub mod interval;
pub mod selection;
pub mod slot;
pub mod types;
pub mod week;

pub use coalesce::{MergeGroup, plan_merges};
pub use conflict::{first_conflict, has_conflict, is_slot_conflicted, overlaps};
pub use directory::{PropertyDirectory, StaticDirectory};
pub use interval::{IntervalError, ShowingInterval};
pub use selection::{ActiveProperty, CandidateSelection, SelectionController, SelectionState};
pub use slot::{GridError, Slot, SlotGrid, generate_slots, slot_to_instant};
pub use types::{OwnerId, PropertyId, ShowingId, ValidationError};
pub use week::{week_bounds, week_start, week_window};
