//! Create command for scheduling a showing window.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use showings_core::slot_to_instant;
use showings_db::ShowingService;

use crate::Config;
use crate::commands::util::{
    format_span, open_database, parse_date, parse_property, parse_range, slot_grid,
};

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Property to schedule.
    #[arg(long)]
    pub property: String,
    /// Day of the showing (YYYY-MM-DD, UTC).
    #[arg(long)]
    pub date: String,
    /// Start time (HH:MM).
    #[arg(long)]
    pub start: String,
    /// End time (HH:MM), exclusive.
    #[arg(long)]
    pub end: String,
}

pub fn run<W: Write>(writer: &mut W, args: &CreateArgs, config: &Config) -> Result<()> {
    let property = parse_property(&args.property)?;
    let date = parse_date(&args.date)?;
    let (start, end) = parse_range(&args.start, &args.end)?;

    let owner = config.owner_id()?;
    let directory = config.directory()?;
    let grid = slot_grid(config)?;
    let mut db = open_database(config)?;
    let mut service = ShowingService::new(&mut db, &directory, grid);

    let showing = service
        .create_showing(
            &owner,
            &property,
            slot_to_instant(date, start),
            slot_to_instant(date, end),
        )
        .context("failed to create showing")?;

    writeln!(
        writer,
        "Scheduled {} on {} {} ({})",
        showing.property_id,
        showing.date(),
        format_span(&showing),
        showing.id
    )?;
    Ok(())
}
