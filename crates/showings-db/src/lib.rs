//! Storage layer for showing windows.
//!
//! Provides persistence for [`ShowingInterval`] records using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` can be moved between threads but not shared without external
//! synchronization. Open one `Database` per thread (or per process) against the
//! same file instead; writers are serialized by `SQLite` itself.
//!
//! # Transactions
//!
//! Every write runs in a `BEGIN IMMEDIATE` transaction, which takes the
//! database write lock up front. The conflict check in
//! [`Database::create_showing`] and the delete-then-insert swap of a merge
//! therefore never interleave with another writer. A writer that finds the
//! lock held waits up to `busy_timeout_ms`, then the whole operation is
//! retried up to `max_retries` times before [`DbError::RetriesExhausted`].
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC with millisecond precision
//! (e.g., `2025-03-02T10:15:00.000Z`). The fixed width keeps lexicographic
//! ordering equal to chronological ordering, so range filters and `ORDER BY`
//! work on the raw column.

mod coalesce;
mod service;

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, TransactionBehavior, params, params_from_iter};
use serde::{Deserialize, Serialize};
use showings_core::{
    IntervalError, PropertyId, ShowingId, ShowingInterval, ValidationError, first_conflict,
};
use thiserror::Error;
use uuid::Uuid;

pub use coalesce::CoalesceStats;
pub use service::{ServiceError, ShowingService};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The candidate overlaps a stored window of the same property.
    #[error("showing overlaps existing showing {existing} for property {property_id}")]
    Conflict {
        property_id: PropertyId,
        existing: ShowingId,
    },
    /// No record with this id exists.
    #[error("showing not found: {0}")]
    NotFound(ShowingId),
    /// The interval bounds are malformed.
    #[error("invalid interval: {0}")]
    InvalidInterval(#[from] IntervalError),
    /// A stored or generated identifier failed validation.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] ValidationError),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for showing {showing_id}: {timestamp}")]
    TimestampParse {
        showing_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// The store stayed locked through every retry.
    #[error("store busy after {attempts} attempts")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: rusqlite::Error,
    },
}

/// Store tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Retries after the first attempt when the store is busy or locked.
    /// Default: 3.
    pub max_retries: u32,
    /// How long a writer waits for the lock before an attempt fails.
    /// Default: 5000.
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
    config: StoreConfig,
}

#[derive(Debug)]
struct ShowingRow {
    id: String,
    property_uid: String,
    start_time: String,
    end_time: String,
}

impl ShowingRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            property_uid: row.get(1)?,
            start_time: row.get(2)?,
            end_time: row.get(3)?,
        })
    }

    fn into_interval(self) -> Result<ShowingInterval, DbError> {
        let start = parse_timestamp(&self.start_time, &self.id)?;
        let end = parse_timestamp(&self.end_time, &self.id)?;
        Ok(ShowingInterval::new(
            ShowingId::new(self.id)?,
            PropertyId::new(self.property_uid)?,
            start,
            end,
        )?)
    }
}

const SELECT_COLUMNS: &str = "SELECT id, property_uid, start_time, end_time FROM showing_interval";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        Self::open_with(path, StoreConfig::default())
    }

    /// Opens a database at the given path with explicit store tuning.
    pub fn open_with(path: &Path, config: StoreConfig) -> Result<Self, DbError> {
        Self::from_connection(Connection::open(path)?, config)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::from_connection(Connection::open_in_memory()?, StoreConfig::default())
    }

    fn from_connection(conn: Connection, config: StoreConfig) -> Result<Self, DbError> {
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        let db = Self { conn, config };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- One row per open showing window.
            -- start_time/end_time: RFC 3339 UTC, half-open [start_time, end_time)
            CREATE TABLE IF NOT EXISTS showing_interval (
                id TEXT PRIMARY KEY,
                property_uid TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                created_at TEXT NOT NULL,
                CHECK (start_time < end_time)
            );

            CREATE INDEX IF NOT EXISTS idx_showing_interval_property_start
                ON showing_interval(property_uid, start_time);
            ",
        )?;
        Ok(())
    }

    pub const fn config(&self) -> StoreConfig {
        self.config
    }

    /// Creates a showing window after re-checking for overlaps.
    ///
    /// The overlap check and the insert run in one immediate transaction, so
    /// two concurrent creates for the same property cannot both succeed.
    /// Windows that only touch an existing one are accepted.
    pub fn create_showing(
        &mut self,
        property_id: &PropertyId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ShowingInterval, DbError> {
        showings_core::interval::ensure_ordered(start, end)?;
        let created = self.with_retry("create_showing", |conn| {
            insert_checked(conn, property_id, start, end)
        })?;
        tracing::debug!(
            id = %created.id,
            property = %property_id,
            %start,
            %end,
            "showing created"
        );
        Ok(created)
    }

    /// Deletes a showing window, returning the removed record.
    pub fn delete_showing(&mut self, id: &ShowingId) -> Result<ShowingInterval, DbError> {
        let removed = self.with_retry("delete_showing", |conn| delete_by_id(conn, id))?;
        tracing::debug!(id = %id, property = %removed.property_id, "showing deleted");
        Ok(removed)
    }

    /// Fetches one showing by id.
    pub fn get_showing(&self, id: &ShowingId) -> Result<Option<ShowingInterval>, DbError> {
        fetch_by_id(&self.conn, id)
    }

    /// Lists a property's showings ordered by start time.
    pub fn list_by_property(
        &self,
        property_id: &PropertyId,
    ) -> Result<Vec<ShowingInterval>, DbError> {
        query_property(&self.conn, property_id, None)
    }

    /// Lists a property's showings starting on `date` (UTC), ordered by start.
    pub fn list_by_property_on(
        &self,
        property_id: &PropertyId,
        date: NaiveDate,
    ) -> Result<Vec<ShowingInterval>, DbError> {
        query_property(&self.conn, property_id, Some(day_bounds(date)))
    }

    /// Lists showings of several properties that start within a week.
    ///
    /// The range is inclusive of `week_start` and exclusive of `week_end`.
    /// Results are ordered by start time, then id.
    pub fn list_for_week(
        &self,
        property_ids: &[PropertyId],
        week_start: DateTime<Utc>,
        week_end: DateTime<Utc>,
    ) -> Result<Vec<ShowingInterval>, DbError> {
        if property_ids.is_empty() || week_end <= week_start {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; property_ids.len()].join(", ");
        let query = format!(
            "{SELECT_COLUMNS}
            WHERE property_uid IN ({placeholders}) AND start_time >= ? AND start_time < ?
            ORDER BY start_time ASC, id ASC"
        );
        let mut values: Vec<String> = property_ids
            .iter()
            .map(|id| id.as_str().to_string())
            .collect();
        values.push(format_timestamp(week_start));
        values.push(format_timestamp(week_end));

        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), ShowingRow::from_row)?;
        collect_intervals(rows)
    }

    /// Runs `op`, retrying while the store reports busy or locked.
    fn with_retry<T>(
        &mut self,
        operation: &'static str,
        mut op: impl FnMut(&mut Connection) -> Result<T, DbError>,
    ) -> Result<T, DbError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match op(&mut self.conn) {
                Err(DbError::Sqlite(source)) if is_busy(&source) => {
                    if attempts > self.config.max_retries {
                        return Err(DbError::RetriesExhausted { attempts, source });
                    }
                    tracing::warn!(operation, attempts, "store busy, retrying");
                    std::thread::sleep(Duration::from_millis(25 * u64::from(attempts)));
                }
                result => return result,
            }
        }
    }
}

fn insert_checked(
    conn: &mut Connection,
    property_id: &PropertyId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<ShowingInterval, DbError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let existing = query_property(&tx, property_id, None)?;
    if let Some(hit) = first_conflict(&existing, start, end) {
        return Err(DbError::Conflict {
            property_id: property_id.clone(),
            existing: hit.id.clone(),
        });
    }
    let interval = ShowingInterval::new(new_showing_id()?, property_id.clone(), start, end)?;
    insert_row(&tx, &interval)?;
    tx.commit()?;
    Ok(interval)
}

fn delete_by_id(conn: &mut Connection, id: &ShowingId) -> Result<ShowingInterval, DbError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let existing = fetch_by_id(&tx, id)?.ok_or_else(|| DbError::NotFound(id.clone()))?;
    tx.execute(
        "DELETE FROM showing_interval WHERE id = ?",
        params![id.as_str()],
    )?;
    tx.commit()?;
    Ok(existing)
}

fn insert_row(conn: &Connection, interval: &ShowingInterval) -> Result<(), DbError> {
    conn.execute(
        "
        INSERT INTO showing_interval (id, property_uid, start_time, end_time, created_at)
        VALUES (?, ?, ?, ?, ?)
        ",
        params![
            interval.id.as_str(),
            interval.property_id.as_str(),
            format_timestamp(interval.start_time),
            format_timestamp(interval.end_time),
            format_timestamp(Utc::now()),
        ],
    )?;
    Ok(())
}

fn fetch_by_id(conn: &Connection, id: &ShowingId) -> Result<Option<ShowingInterval>, DbError> {
    let row = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?"),
            params![id.as_str()],
            ShowingRow::from_row,
        )
        .optional()?;
    row.map(ShowingRow::into_interval).transpose()
}

fn query_property(
    conn: &Connection,
    property_id: &PropertyId,
    range: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Result<Vec<ShowingInterval>, DbError> {
    let mut values = vec![property_id.as_str().to_string()];
    let mut predicate = String::from("property_uid = ?");
    if let Some((from, to)) = range {
        predicate.push_str(" AND start_time >= ? AND start_time < ?");
        values.push(format_timestamp(from));
        values.push(format_timestamp(to));
    }
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS}
        WHERE {predicate}
        ORDER BY start_time ASC, id ASC"
    ))?;
    let rows = stmt.query_map(params_from_iter(values.iter()), ShowingRow::from_row)?;
    collect_intervals(rows)
}

fn collect_intervals(
    rows: impl Iterator<Item = rusqlite::Result<ShowingRow>>,
) -> Result<Vec<ShowingInterval>, DbError> {
    let mut intervals = Vec::new();
    for row in rows {
        intervals.push(row?.into_interval()?);
    }
    Ok(intervals)
}

fn new_showing_id() -> Result<ShowingId, DbError> {
    Ok(ShowingId::new(Uuid::new_v4().to_string())?)
}

fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

/// Half-open UTC bounds of a calendar date.
fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + chrono::Duration::days(1))
}

fn parse_timestamp(timestamp: &str, showing_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            showing_id: showing_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
