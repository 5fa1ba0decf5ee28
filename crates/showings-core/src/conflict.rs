//! Overlap detection for showing windows.
//!
//! Callers pass the intervals of a single property: each property has its
//! own timeline, so windows of different properties never conflict.
//!
//! Windows that merely touch (`a.end == b.start`) do not conflict. They are
//! accepted and later folded together by the coalescing pass.

use chrono::{DateTime, NaiveDate, Utc};

use crate::interval::ShowingInterval;
use crate::slot::SlotGrid;

/// Half-open overlap test: `[s1, e1)` and `[s2, e2)` overlap iff
/// `s1 < e2 && s2 < e1`.
pub fn overlaps(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

/// Returns the first existing interval overlapping `[start, end)`.
pub fn first_conflict<'a>(
    existing: impl IntoIterator<Item = &'a ShowingInterval>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<&'a ShowingInterval> {
    existing
        .into_iter()
        .find(|interval| overlaps(interval.start_time, interval.end_time, start, end))
}

pub fn has_conflict<'a>(
    existing: impl IntoIterator<Item = &'a ShowingInterval>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> bool {
    first_conflict(existing, start, end).is_some()
}

/// Whether the single-slot micro interval at `slot_value` on `date` overlaps
/// an existing window.
pub fn is_slot_conflicted<'a>(
    existing: impl IntoIterator<Item = &'a ShowingInterval>,
    grid: &SlotGrid,
    slot_value: u32,
    date: NaiveDate,
) -> bool {
    let (start, end) = grid.slot_span(date, slot_value);
    has_conflict(existing, start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PropertyId, ShowingId};

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn interval(id: &str, start: &str, end: &str) -> ShowingInterval {
        ShowingInterval::new(
            ShowingId::new(id).unwrap(),
            PropertyId::new("prop-1").unwrap(),
            ts(start),
            ts(end),
        )
        .unwrap()
    }

    #[test]
    fn overlap_is_strict_for_half_open_ranges() {
        let nine = ts("2025-03-02T09:00:00Z");
        let ten = ts("2025-03-02T10:00:00Z");
        let eleven = ts("2025-03-02T11:00:00Z");
        let half_ten = ts("2025-03-02T10:30:00Z");

        assert!(overlaps(nine, eleven, ten, half_ten));
        assert!(overlaps(ten, half_ten, nine, eleven));
        assert!(!overlaps(nine, ten, ten, eleven));
        assert!(!overlaps(ten, eleven, nine, ten));
    }

    #[test]
    fn contained_candidate_conflicts() {
        let existing = vec![interval("a", "2025-03-02T10:00:00Z", "2025-03-02T11:00:00Z")];

        assert!(has_conflict(
            &existing,
            ts("2025-03-02T10:30:00Z"),
            ts("2025-03-02T10:45:00Z"),
        ));
        let hit = first_conflict(
            &existing,
            ts("2025-03-02T09:00:00Z"),
            ts("2025-03-02T12:00:00Z"),
        );
        assert_eq!(hit.map(|i| i.id.as_str()), Some("a"));
    }

    #[test]
    fn touching_candidate_does_not_conflict() {
        let existing = vec![interval("a", "2025-03-02T10:00:00Z", "2025-03-02T11:00:00Z")];

        assert!(!has_conflict(
            &existing,
            ts("2025-03-02T11:00:00Z"),
            ts("2025-03-02T11:30:00Z"),
        ));
        assert!(!has_conflict(
            &existing,
            ts("2025-03-02T09:30:00Z"),
            ts("2025-03-02T10:00:00Z"),
        ));
    }

    #[test]
    fn slot_conflict_checks_single_step() {
        let grid = SlotGrid::default();
        let date = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let existing = vec![interval("a", "2025-03-02T10:15:00Z", "2025-03-02T10:30:00Z")];

        assert!(!is_slot_conflicted(&existing, &grid, 600, date));
        assert!(is_slot_conflicted(&existing, &grid, 615, date));
        assert!(!is_slot_conflicted(&existing, &grid, 630, date));

        let other_day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert!(!is_slot_conflicted(&existing, &grid, 615, other_day));
    }

    #[test]
    fn empty_set_never_conflicts() {
        let existing: Vec<ShowingInterval> = Vec::new();
        assert!(!has_conflict(
            &existing,
            ts("2025-03-02T10:00:00Z"),
            ts("2025-03-02T11:00:00Z"),
        ));
    }
}
