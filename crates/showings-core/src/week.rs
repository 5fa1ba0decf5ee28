//! Sunday-anchored 7-day display window.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};

/// Most recent Sunday at or before `anchor`.
pub fn week_start(anchor: NaiveDate) -> NaiveDate {
    anchor - Days::new(u64::from(anchor.weekday().num_days_from_sunday()))
}

/// The 7 consecutive dates of the week containing `anchor`, Sunday first.
pub fn week_window(anchor: NaiveDate) -> [NaiveDate; 7] {
    let start = week_start(anchor);
    std::array::from_fn(|offset| start + Days::new(offset as u64))
}

/// Half-open UTC bounds `[Sunday 00:00, next Sunday 00:00)` of the week.
pub fn week_bounds(anchor: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = week_start(anchor);
    let end = start + Days::new(7);
    (
        start.and_time(NaiveTime::MIN).and_utc(),
        end.and_time(NaiveTime::MIN).and_utc(),
    )
}
