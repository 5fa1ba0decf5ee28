//! Slots command for printing the day grid.

use std::io::Write;

use anyhow::Result;

use crate::Config;
use crate::commands::util::slot_grid;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let grid = slot_grid(config)?;
    for slot in grid.slots() {
        writeln!(writer, "{slot}  ({})", slot.value())?;
    }
    Ok(())
}
