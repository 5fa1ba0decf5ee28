//! Properties command for listing what the owner may schedule.

use std::io::Write;

use anyhow::Result;
use showings_core::PropertyDirectory;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let owner = config.owner_id()?;
    let properties = config.directory()?.properties_for_owner(&owner);

    if properties.is_empty() {
        writeln!(writer, "No properties for {owner}.")?;
        return Ok(());
    }
    for property in properties {
        writeln!(writer, "{property}")?;
    }
    Ok(())
}
