//! Drag selection over the slot grid.
//!
//! [`SelectionController`] turns pointer engagement into a
//! [`CandidateSelection`]. It is synchronous and owns no storage: conflict
//! gating runs against a local snapshot and is advisory only. The store
//! re-checks every candidate inside its own transaction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::conflict::is_slot_conflicted;
use crate::interval::ShowingInterval;
use crate::slot::SlotGrid;
use crate::types::PropertyId;

/// Which properties the calendar is currently showing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "scope", content = "property_id", rename_all = "snake_case")]
pub enum ActiveProperty {
    /// Aggregate view across every owned property. Selection is disabled.
    #[default]
    All,
    /// A single concrete property.
    Single(PropertyId),
}

/// Controller state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    Idle,
    Selecting {
        property_id: PropertyId,
        date: NaiveDate,
        /// Slot where the pointer went down.
        anchor: u32,
        /// Furthest slot the selection has reached.
        current: u32,
    },
}

impl SelectionState {
    /// Selecting date with the inclusive `low`/`high` slot bounds, when selecting.
    pub fn range(&self) -> Option<(NaiveDate, u32, u32)> {
        match self {
            Self::Idle => None,
            Self::Selecting {
                date,
                anchor,
                current,
                ..
            } => Some((*date, *anchor.min(current), *anchor.max(current))),
        }
    }
}

/// A not-yet-committed range produced by a drag. Slots are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSelection {
    pub property_id: PropertyId,
    pub date: NaiveDate,
    pub start_slot: u32,
    pub end_slot: u32,
}

impl CandidateSelection {
    /// Half-open instants covered by the selection: the end slot is included,
    /// so the interval closes one step after it.
    pub fn bounds(&self, grid: &SlotGrid) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = grid.slot_to_instant(self.date, self.start_slot);
        let (_, end) = grid.slot_span(self.date, self.end_slot);
        (start, end)
    }
}

/// Drag-selection state machine for one calendar view.
#[derive(Debug, Clone)]
pub struct SelectionController {
    grid: SlotGrid,
    active: ActiveProperty,
    state: SelectionState,
    snapshot: Vec<ShowingInterval>,
}

impl SelectionController {
    pub fn new(grid: SlotGrid) -> Self {
        Self {
            grid,
            active: ActiveProperty::All,
            state: SelectionState::Idle,
            snapshot: Vec::new(),
        }
    }

    pub const fn state(&self) -> &SelectionState {
        &self.state
    }

    pub const fn active(&self) -> &ActiveProperty {
        &self.active
    }

    /// Switches the active context. Any selection in progress is dropped.
    pub fn set_active_property(&mut self, active: ActiveProperty) {
        self.active = active;
        self.state = SelectionState::Idle;
    }

    /// Replaces the snapshot of stored intervals used for live gating.
    pub fn refresh(&mut self, intervals: Vec<ShowingInterval>) {
        self.snapshot = intervals;
    }

    /// Whether `slot` on `date` is blocked for the active property.
    pub fn is_conflicted(&self, date: NaiveDate, slot: u32) -> bool {
        match &self.active {
            ActiveProperty::All => false,
            ActiveProperty::Single(property_id) => self.blocked(property_id, date, slot),
        }
    }

    /// Starts a selection. Ignored unless idle, scoped to one property, and
    /// the slot is on the grid and free.
    pub fn pointer_down(&mut self, date: NaiveDate, slot: u32) {
        if self.state != SelectionState::Idle || !self.grid.contains(slot) {
            return;
        }
        let ActiveProperty::Single(property_id) = &self.active else {
            return;
        };
        if self.blocked(property_id, date, slot) {
            tracing::debug!(%date, slot, "pointer down on conflicted slot ignored");
            return;
        }
        self.state = SelectionState::Selecting {
            property_id: property_id.clone(),
            date,
            anchor: slot,
            current: slot,
        };
    }

    /// Moves the selection toward `slot`.
    ///
    /// The selection grows one step at a time from the anchor and stops at
    /// the last free slot before a conflicted one; it never skips a conflict.
    /// Slots on other dates are ignored.
    pub fn pointer_enter(&mut self, date: NaiveDate, slot: u32) {
        let SelectionState::Selecting {
            property_id,
            date: selecting_date,
            anchor,
            ..
        } = &self.state
        else {
            return;
        };
        if *selecting_date != date || !self.grid.contains(slot) {
            return;
        }

        let anchor = *anchor;
        let step = self.grid.step_minutes();
        let mut reached = anchor;
        while reached != slot {
            let next = if slot > reached {
                reached + step
            } else {
                reached - step
            };
            if self.blocked(property_id, date, next) {
                break;
            }
            reached = next;
        }

        if let SelectionState::Selecting { current, .. } = &mut self.state {
            *current = reached;
        }
    }

    /// Ends the drag and returns the candidate, resetting to idle.
    pub fn pointer_release(&mut self) -> Option<CandidateSelection> {
        let state = std::mem::take(&mut self.state);
        let SelectionState::Selecting {
            property_id,
            date,
            anchor,
            current,
        } = state
        else {
            return None;
        };
        let candidate = CandidateSelection {
            property_id,
            date,
            start_slot: anchor.min(current),
            end_slot: anchor.max(current),
        };
        tracing::debug!(?candidate, "selection released");
        Some(candidate)
    }

    /// Pointer left the grid. Treated as a release.
    pub fn pointer_leave(&mut self) -> Option<CandidateSelection> {
        self.pointer_release()
    }

    /// Drops any selection in progress.
    pub fn cancel(&mut self) {
        self.state = SelectionState::Idle;
    }

    /// Whether `slot` on `date` should be highlighted.
    pub fn is_selected(&self, date: NaiveDate, slot: u32) -> bool {
        self.state
            .range()
            .is_some_and(|(selecting_date, low, high)| {
                selecting_date == date && (low..=high).contains(&slot)
            })
    }

    fn blocked(&self, property_id: &PropertyId, date: NaiveDate, slot: u32) -> bool {
        let scoped = self
            .snapshot
            .iter()
            .filter(|interval| &interval.property_id == property_id);
        is_slot_conflicted(scoped, &self.grid, slot, date)
    }
}
