//! Planning for the coalescing pass.
//!
//! # Algorithm
//!
//! 1. Group intervals by property and by the UTC calendar date they start on
//! 2. Sort each group by start time
//! 3. Sweep, extending the running run while `last.end_time == next.start_time`
//! 4. Every run with more than one member becomes a [`MergeGroup`]
//!
//! Only exact touches are merged. Overlapping records cannot exist because the
//! store rejects them on create. Executing the plan (deleting the members and
//! inserting the spanning record) is the storage layer's job.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::interval::ShowingInterval;
use crate::types::{PropertyId, ShowingId};

/// A run of touching intervals to be replaced by one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeGroup {
    pub property_id: PropertyId,
    pub date: NaiveDate,
    /// Member ids in ascending start order.
    pub members: Vec<ShowingId>,
    /// Start of the first member.
    pub start_time: DateTime<Utc>,
    /// End of the last member.
    pub end_time: DateTime<Utc>,
}

/// Plans the merges needed to leave no touching intervals.
///
/// The result is ordered by property, then date, then start time. An empty
/// plan means the input is already fully compacted.
pub fn plan_merges(intervals: &[ShowingInterval]) -> Vec<MergeGroup> {
    let mut by_day: BTreeMap<(&PropertyId, NaiveDate), Vec<&ShowingInterval>> = BTreeMap::new();
    for interval in intervals {
        by_day
            .entry((&interval.property_id, interval.date()))
            .or_default()
            .push(interval);
    }

    let mut groups = Vec::new();
    for ((property_id, date), mut day) in by_day {
        day.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut run: Vec<&ShowingInterval> = Vec::new();
        for interval in day {
            if run.last().is_some_and(|last| last.touches(interval)) {
                run.push(interval);
                continue;
            }
            close_run(&mut groups, property_id, date, &run);
            run.clear();
            run.push(interval);
        }
        close_run(&mut groups, property_id, date, &run);
    }
    groups
}

fn close_run(
    groups: &mut Vec<MergeGroup>,
    property_id: &PropertyId,
    date: NaiveDate,
    run: &[&ShowingInterval],
) {
    let (Some(first), Some(last)) = (run.first(), run.last()) else {
        return;
    };
    if run.len() < 2 {
        return;
    }
    groups.push(MergeGroup {
        property_id: property_id.clone(),
        date,
        members: run.iter().map(|interval| interval.id.clone()).collect(),
        start_time: first.start_time,
        end_time: last.end_time,
    });
}
