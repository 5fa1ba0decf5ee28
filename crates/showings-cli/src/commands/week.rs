//! Week command for the Sunday-anchored calendar view.

use std::io::Write;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Args;
use serde::Serialize;
use showings_core::{ShowingInterval, week_window};
use showings_db::ShowingService;

use crate::Config;
use crate::commands::util::{format_span, open_database, parse_date, parse_property, slot_grid};

#[derive(Debug, Args)]
pub struct WeekArgs {
    /// Any date in the week to show (YYYY-MM-DD). Defaults to today (UTC).
    pub date: Option<String>,
    /// Only show this property.
    #[arg(long)]
    pub property: Option<String>,
    /// Print JSON instead of a calendar.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct WeekView {
    week_start: NaiveDate,
    days: Vec<DayView>,
}

#[derive(Debug, Serialize)]
struct DayView {
    date: NaiveDate,
    showings: Vec<ShowingInterval>,
}

pub fn run<W: Write>(writer: &mut W, args: &WeekArgs, config: &Config) -> Result<()> {
    let anchor = match &args.date {
        Some(date) => parse_date(date)?,
        None => Utc::now().date_naive(),
    };
    let property = args.property.as_deref().map(parse_property).transpose()?;

    let owner = config.owner_id()?;
    let directory = config.directory()?;
    let grid = slot_grid(config)?;
    let mut db = open_database(config)?;
    let service = ShowingService::new(&mut db, &directory, grid);

    let showings = service.list_week(&owner, anchor, property.as_ref())?;
    let view = group_by_day(anchor, showings);

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&view)?)?;
        return Ok(());
    }

    writeln!(writer, "Week of {}", view.week_start.format("%a %b %-d, %Y"))?;
    for day in &view.days {
        writeln!(writer)?;
        writeln!(writer, "{}", day.date.format("%a %Y-%m-%d"))?;
        if day.showings.is_empty() {
            writeln!(writer, "  -")?;
        }
        for showing in &day.showings {
            writeln!(
                writer,
                "  {}  {:<10}  {}",
                format_span(showing),
                showing.property_id,
                showing.id
            )?;
        }
    }
    Ok(())
}

fn group_by_day(anchor: NaiveDate, showings: Vec<ShowingInterval>) -> WeekView {
    let dates = week_window(anchor);
    let mut days: Vec<DayView> = dates
        .iter()
        .map(|&date| DayView {
            date,
            showings: Vec::new(),
        })
        .collect();
    for showing in showings {
        if let Some(day) = days.iter_mut().find(|day| day.date == showing.date()) {
            day.showings.push(showing);
        }
    }
    WeekView {
        week_start: dates[0],
        days,
    }
}
