//! Shared utilities for CLI commands.

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveTime, Timelike};
use showings_core::{PropertyId, ShowingInterval, SlotGrid};
use showings_db::Database;

use crate::Config;

/// Opens the configured database, creating its parent directory.
pub fn open_database(config: &Config) -> Result<Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    Database::open_with(&config.database_path, config.store)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

/// The configured display grid.
pub fn slot_grid(config: &Config) -> Result<SlotGrid> {
    config
        .grid
        .slot_grid()
        .context("invalid grid configuration")
}

/// Parses a calendar date such as `2025-03-02`.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date: {s}. Use YYYY-MM-DD (e.g., 2025-03-02)"))
}

/// Parses a wall-clock time such as `09:30` into minutes since midnight.
pub fn parse_clock(s: &str) -> Result<u32> {
    let time = NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .with_context(|| format!("invalid time: {s}. Use HH:MM (e.g., 09:30)"))?;
    Ok(time.hour() * 60 + time.minute())
}

pub fn parse_property(s: &str) -> Result<PropertyId> {
    PropertyId::new(s).context("invalid property id")
}

/// Parses `--start`/`--end` clock values, rejecting a reversed pair early.
pub fn parse_range(start: &str, end: &str) -> Result<(u32, u32)> {
    let start = parse_clock(start)?;
    let end = parse_clock(end)?;
    if end <= start {
        bail!("end time must be after start time");
    }
    Ok((start, end))
}

/// Minutes since midnight as `HH:MM`.
pub fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// `HH:MM-HH:MM` in UTC.
pub fn format_span(showing: &ShowingInterval) -> String {
    format!(
        "{}-{}",
        showing.start_time.format("%H:%M"),
        showing.end_time.format("%H:%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_clock_returns_minutes_since_midnight() {
        assert_eq!(parse_clock("00:00").unwrap(), 0);
        assert_eq!(parse_clock("09:30").unwrap(), 570);
        assert_eq!(parse_clock(" 20:00 ").unwrap(), 1200);
    }

    #[test]
    fn parse_clock_rejects_garbage() {
        let err = parse_clock("9h30").unwrap_err();
        assert!(err.to_string().contains("invalid time"));
        assert!(parse_clock("25:00").is_err());
    }

    #[test]
    fn format_minutes_pads_hours() {
        assert_eq!(format_minutes(570), "09:30");
        assert_eq!(format_minutes(1215), "20:15");
    }

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date("2025-03-02").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()
        );
        assert!(parse_date("03/02/2025").is_err());
    }

    #[test]
    fn parse_range_rejects_reversed_pair() {
        assert_eq!(parse_range("09:00", "10:15").unwrap(), (540, 615));
        let err = parse_range("10:00", "09:00").unwrap_err();
        assert!(err.to_string().contains("end time must be after start time"));
        assert!(parse_range("10:00", "10:00").is_err());
    }

    #[test]
    fn open_database_creates_parent_directory() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("nested").join("showings.db"),
            ..Config::default()
        };
        open_database(&config).unwrap();
        assert!(config.database_path.exists());
    }
}
