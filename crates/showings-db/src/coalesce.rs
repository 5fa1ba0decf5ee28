//! Executes coalescing plans against the store.
//!
//! Each merge group is swapped in its own immediate transaction: the members
//! are deleted and the spanning record inserted atomically, so readers see
//! either the old records or the merged one. Plans are computed outside the
//! transaction; if a member has vanished in the meantime (another pass or
//! session got there first) the group is rolled back and skipped.

use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior, params};
use showings_core::{MergeGroup, PropertyId, ShowingInterval, first_conflict, plan_merges};

use crate::{DbError, Database, insert_row, new_showing_id, query_property};

/// Summary of a coalescing pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CoalesceStats {
    pub groups_merged: usize,
    pub intervals_removed: usize,
}

impl Database {
    /// Merges every run of touching showings for one property.
    pub fn coalesce_property(&mut self, property_id: &PropertyId) -> Result<CoalesceStats, DbError> {
        let intervals = self.list_by_property(property_id)?;
        self.apply_merges(&intervals)
    }

    /// Merges runs of touching showings for one property on one date.
    pub fn coalesce_property_on(
        &mut self,
        property_id: &PropertyId,
        date: NaiveDate,
    ) -> Result<CoalesceStats, DbError> {
        let intervals = self.list_by_property_on(property_id, date)?;
        self.apply_merges(&intervals)
    }

    fn apply_merges(&mut self, intervals: &[ShowingInterval]) -> Result<CoalesceStats, DbError> {
        let mut stats = CoalesceStats::default();
        for group in plan_merges(intervals) {
            match self.with_retry("coalesce", |conn| replace_group(conn, &group)) {
                Ok(merged) => {
                    tracing::info!(
                        property = %group.property_id,
                        date = %group.date,
                        merged = %merged.id,
                        members = group.members.len(),
                        "coalesced showings"
                    );
                    stats.groups_merged += 1;
                    stats.intervals_removed += group.members.len();
                }
                Err(DbError::NotFound(missing)) => {
                    tracing::debug!(
                        property = %group.property_id,
                        missing = %missing,
                        "merge group changed concurrently, skipping"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        Ok(stats)
    }
}

fn replace_group(conn: &mut Connection, group: &MergeGroup) -> Result<ShowingInterval, DbError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    for member in &group.members {
        let removed = tx.execute(
            "DELETE FROM showing_interval WHERE id = ?",
            params![member.as_str()],
        )?;
        if removed == 0 {
            return Err(DbError::NotFound(member.clone()));
        }
    }

    let remaining = query_property(&tx, &group.property_id, None)?;
    if let Some(hit) = first_conflict(&remaining, group.start_time, group.end_time) {
        return Err(DbError::Conflict {
            property_id: group.property_id.clone(),
            existing: hit.id.clone(),
        });
    }

    let merged = ShowingInterval::new(
        new_showing_id()?,
        group.property_id.clone(),
        group.start_time,
        group.end_time,
    )?;
    insert_row(&tx, &merged)?;
    tx.commit()?;
    Ok(merged)
}
