//! Delete command for removing a showing window.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use showings_core::ShowingId;
use showings_db::{ServiceError, ShowingService};

use crate::Config;
use crate::commands::util::{format_span, open_database, slot_grid};

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Showing ID to delete.
    pub id: String,
}

pub fn run<W: Write>(writer: &mut W, args: &DeleteArgs, config: &Config) -> Result<()> {
    let id = ShowingId::new(args.id.as_str()).context("invalid showing id")?;

    let owner = config.owner_id()?;
    let directory = config.directory()?;
    let grid = slot_grid(config)?;
    let mut db = open_database(config)?;
    let mut service = ShowingService::new(&mut db, &directory, grid);

    match service.delete_showing(&owner, &id) {
        Ok(removed) => writeln!(
            writer,
            "Deleted {} on {} {} ({})",
            removed.property_id,
            removed.date(),
            format_span(&removed),
            removed.id
        )?,
        // Already gone counts as deleted.
        Err(ServiceError::NotFound(_)) => writeln!(writer, "Showing {id} already removed.")?,
        Err(err) => return Err(err).context("failed to delete showing"),
    }
    Ok(())
}
