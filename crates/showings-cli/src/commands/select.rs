//! Select command for replaying a drag gesture on the day grid.
//!
//! The gesture is a comma-separated script of pointer events, e.g.
//! `down 10:00, enter 09:00, up`. Every released selection is committed
//! through the service, and the controller's snapshot is refreshed after
//! each commit so later drags gate against the new window.

use std::io::Write;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::Args;
use showings_core::{ActiveProperty, PropertyDirectory, SelectionController};
use showings_db::ShowingService;

use crate::Config;
use crate::commands::util::{
    format_minutes, format_span, open_database, parse_clock, parse_date, parse_property,
    slot_grid,
};

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Property to schedule.
    #[arg(long)]
    pub property: String,
    /// Day of the grid (YYYY-MM-DD, UTC).
    #[arg(long)]
    pub date: String,
    /// Pointer events, e.g. "down 10:00, enter 09:00, up".
    #[arg(long)]
    pub events: String,
}

/// One pointer event on the grid. Times are minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down(u32),
    Enter(u32),
    Up,
    Leave,
    Cancel,
}

impl FromStr for PointerEvent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let event = match (parts.next(), parts.next()) {
            (Some("down"), Some(time)) => Self::Down(parse_clock(time)?),
            (Some("enter"), Some(time)) => Self::Enter(parse_clock(time)?),
            (Some("up"), None) => Self::Up,
            (Some("leave"), None) => Self::Leave,
            (Some("cancel"), None) => Self::Cancel,
            _ => bail!("invalid pointer event: {s:?}. Use down HH:MM, enter HH:MM, up, leave or cancel"),
        };
        if parts.next().is_some() {
            bail!("invalid pointer event: {s:?}");
        }
        Ok(event)
    }
}

/// Parses a comma-separated event script.
pub fn parse_events(script: &str) -> Result<Vec<PointerEvent>> {
    script
        .split(',')
        .map(str::trim)
        .filter(|event| !event.is_empty())
        .map(str::parse)
        .collect()
}

pub fn run<W: Write>(writer: &mut W, args: &SelectArgs, config: &Config) -> Result<()> {
    let property = parse_property(&args.property)?;
    let date = parse_date(&args.date)?;
    let events = parse_events(&args.events)?;

    let owner = config.owner_id()?;
    let directory = config.directory()?;
    if !directory.owns(&owner, &property) {
        bail!("owner {owner} does not own property {property}");
    }
    let grid = slot_grid(config)?;
    let mut db = open_database(config)?;

    let mut controller = SelectionController::new(grid);
    controller.set_active_property(ActiveProperty::Single(property.clone()));
    controller.refresh(db.list_by_property_on(&property, date)?);

    let mut committed = 0;
    for event in events {
        tracing::debug!(?event, "pointer event");
        let released = match event {
            PointerEvent::Down(slot) => {
                controller.pointer_down(date, slot);
                if controller.state().range().is_none() {
                    writeln!(writer, "Slot {} is unavailable.", format_minutes(slot))?;
                }
                None
            }
            PointerEvent::Enter(slot) => {
                controller.pointer_enter(date, slot);
                None
            }
            PointerEvent::Up => controller.pointer_release(),
            PointerEvent::Leave => controller.pointer_leave(),
            PointerEvent::Cancel => {
                controller.cancel();
                None
            }
        };
        let Some(candidate) = released else {
            continue;
        };

        let (start, end) = candidate.bounds(&grid);
        writeln!(
            writer,
            "Selected {}-{} on {}",
            start.format("%H:%M"),
            end.format("%H:%M"),
            candidate.date
        )?;

        let showing = ShowingService::new(&mut db, &directory, grid)
            .commit_selection(&owner, &candidate)
            .context("failed to commit selection")?;
        writeln!(
            writer,
            "Scheduled {} on {} {} ({})",
            showing.property_id,
            showing.date(),
            format_span(&showing),
            showing.id
        )?;
        committed += 1;

        controller.refresh(db.list_by_property_on(&property, date)?);
    }

    if let Some((_, low, high)) = controller.state().range() {
        writeln!(
            writer,
            "Selection {}-{} was never released; discarded.",
            format_minutes(low),
            format_minutes(high)
        )?;
        controller.cancel();
    }
    if committed == 0 {
        writeln!(writer, "No selection committed.")?;
    }
    Ok(())
}
