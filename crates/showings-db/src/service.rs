//! Command/query surface for the calendar UI.
//!
//! Owner identity and property ownership are resolved outside the scheduler;
//! [`ShowingService`] only asks its [`PropertyDirectory`] whether the caller
//! may act on a property. After each successful create or delete it runs the
//! coalescing pass for the affected property and date. A failed pass is
//! logged and never undoes the mutation that triggered it.

use chrono::{DateTime, NaiveDate, Utc};
use showings_core::{
    CandidateSelection, IntervalError, OwnerId, PropertyDirectory, PropertyId, ShowingId,
    ShowingInterval, SlotGrid, week_bounds,
};
use thiserror::Error;

use crate::{CoalesceStats, Database, DbError};

/// Errors surfaced to the calendar UI.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller does not own the target property.
    #[error("owner {owner} does not own property {property_id}")]
    NotOwned {
        owner: OwnerId,
        property_id: PropertyId,
    },
    /// Malformed candidate; the caller has to pick a different range.
    #[error("invalid showing: {0}")]
    Validation(#[from] IntervalError),
    /// Overlaps a stored window of the same property.
    #[error("showing overlaps existing showing {existing} for property {property_id}")]
    Conflict {
        property_id: PropertyId,
        existing: ShowingId,
    },
    /// The target is already gone.
    #[error("showing not found: {0}")]
    NotFound(ShowingId),
    #[error(transparent)]
    Store(DbError),
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict {
                property_id,
                existing,
            } => Self::Conflict {
                property_id,
                existing,
            },
            DbError::NotFound(id) => Self::NotFound(id),
            DbError::InvalidInterval(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

/// Scheduler operations scoped to an owner.
pub struct ShowingService<'a, D: PropertyDirectory + ?Sized> {
    db: &'a mut Database,
    directory: &'a D,
    grid: SlotGrid,
}

impl<'a, D: PropertyDirectory + ?Sized> ShowingService<'a, D> {
    pub fn new(db: &'a mut Database, directory: &'a D, grid: SlotGrid) -> Self {
        Self {
            db,
            directory,
            grid,
        }
    }

    pub const fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    /// Properties the owner may schedule, as reported by the directory.
    pub fn list_properties_for_owner(&self, owner: &OwnerId) -> Vec<PropertyId> {
        self.directory.properties_for_owner(owner)
    }

    /// Every showing of the owner's properties, ordered by start time.
    pub fn list_showings(&self, owner: &OwnerId) -> Result<Vec<ShowingInterval>, ServiceError> {
        let mut showings = Vec::new();
        for property_id in self.list_properties_for_owner(owner) {
            showings.extend(self.db.list_by_property(&property_id)?);
        }
        sort_by_start(&mut showings);
        Ok(showings)
    }

    /// Showings of the owner's properties in the week containing `anchor`.
    ///
    /// With `property` set, only that property is listed.
    pub fn list_week(
        &self,
        owner: &OwnerId,
        anchor: NaiveDate,
        property: Option<&PropertyId>,
    ) -> Result<Vec<ShowingInterval>, ServiceError> {
        let properties = match property {
            Some(property_id) => {
                self.ensure_owned(owner, property_id)?;
                vec![property_id.clone()]
            }
            None => self.list_properties_for_owner(owner),
        };
        let (week_start, week_end) = week_bounds(anchor);
        Ok(self.db.list_for_week(&properties, week_start, week_end)?)
    }

    /// Creates a showing window and folds it into any touching neighbours.
    ///
    /// Returns the record that covers the new window once coalescing has run:
    /// the created record, or the merged record that absorbed it.
    pub fn create_showing(
        &mut self,
        owner: &OwnerId,
        property_id: &PropertyId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ShowingInterval, ServiceError> {
        self.ensure_owned(owner, property_id)?;
        self.grid.validate_interval(start, end)?;
        let created = self.db.create_showing(property_id, start, end)?;
        Ok(self.settle(created))
    }

    /// Commits a drag selection.
    pub fn commit_selection(
        &mut self,
        owner: &OwnerId,
        candidate: &CandidateSelection,
    ) -> Result<ShowingInterval, ServiceError> {
        let (start, end) = candidate.bounds(&self.grid);
        self.create_showing(owner, &candidate.property_id, start, end)
    }

    /// Deletes a showing the owner controls, returning the removed record.
    pub fn delete_showing(
        &mut self,
        owner: &OwnerId,
        id: &ShowingId,
    ) -> Result<ShowingInterval, ServiceError> {
        let existing = self
            .db
            .get_showing(id)?
            .ok_or_else(|| ServiceError::NotFound(id.clone()))?;
        self.ensure_owned(owner, &existing.property_id)?;

        let removed = self.db.delete_showing(id)?;
        if let Err(err) = self
            .db
            .coalesce_property_on(&removed.property_id, removed.date())
        {
            tracing::warn!(
                property = %removed.property_id,
                error = %err,
                "coalescing after delete failed"
            );
        }
        Ok(removed)
    }

    /// Runs a full coalescing pass over one of the owner's properties.
    pub fn coalesce(
        &mut self,
        owner: &OwnerId,
        property_id: &PropertyId,
    ) -> Result<CoalesceStats, ServiceError> {
        self.ensure_owned(owner, property_id)?;
        Ok(self.db.coalesce_property(property_id)?)
    }

    fn ensure_owned(&self, owner: &OwnerId, property_id: &PropertyId) -> Result<(), ServiceError> {
        if self.directory.owns(owner, property_id) {
            Ok(())
        } else {
            Err(ServiceError::NotOwned {
                owner: owner.clone(),
                property_id: property_id.clone(),
            })
        }
    }

    fn settle(&mut self, created: ShowingInterval) -> ShowingInterval {
        let date = created.date();
        match self.db.coalesce_property_on(&created.property_id, date) {
            Ok(stats) if stats.groups_merged > 0 => {
                match self.db.list_by_property_on(&created.property_id, date) {
                    Ok(day) => day
                        .into_iter()
                        .find(|interval| {
                            interval.start_time <= created.start_time
                                && interval.end_time >= created.end_time
                        })
                        .unwrap_or(created),
                    Err(err) => {
                        tracing::warn!(
                            property = %created.property_id,
                            error = %err,
                            "reading merged showing failed; returning created record"
                        );
                        created
                    }
                }
            }
            Ok(_) => created,
            Err(err) => {
                tracing::warn!(
                    property = %created.property_id,
                    error = %err,
                    "coalescing after create failed; showings left unmerged"
                );
                created
            }
        }
    }
}

fn sort_by_start(showings: &mut [ShowingInterval]) {
    showings.sort_by(|a, b| {
        a.start_time
            .cmp(&b.start_time)
            .then_with(|| a.property_id.cmp(&b.property_id))
    });
}
