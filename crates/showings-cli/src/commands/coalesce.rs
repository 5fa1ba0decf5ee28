//! Coalesce command for merging touching showing windows.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use showings_db::ShowingService;

use crate::Config;
use crate::commands::util::{open_database, parse_property, slot_grid};

#[derive(Debug, Args)]
pub struct CoalesceArgs {
    /// Only coalesce this property. Defaults to every owned property.
    #[arg(long)]
    pub property: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, args: &CoalesceArgs, config: &Config) -> Result<()> {
    let owner = config.owner_id()?;
    let directory = config.directory()?;
    let grid = slot_grid(config)?;
    let mut db = open_database(config)?;
    let mut service = ShowingService::new(&mut db, &directory, grid);

    let properties = match &args.property {
        Some(property) => vec![parse_property(property)?],
        None => service.list_properties_for_owner(&owner),
    };

    for property in properties {
        let stats = service
            .coalesce(&owner, &property)
            .with_context(|| format!("failed to coalesce {property}"))?;
        writeln!(
            writer,
            "{property}: merged {} group(s), {} showing(s) combined",
            stats.groups_merged, stats.intervals_removed
        )?;
    }
    Ok(())
}
