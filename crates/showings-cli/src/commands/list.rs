//! List command for showing every scheduled window of the owner.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use showings_db::ShowingService;

use crate::Config;
use crate::commands::util::{format_span, open_database, slot_grid};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &ListArgs, config: &Config) -> Result<()> {
    let owner = config.owner_id()?;
    let directory = config.directory()?;
    let grid = slot_grid(config)?;
    let mut db = open_database(config)?;
    let service = ShowingService::new(&mut db, &directory, grid);

    let showings = service.list_showings(&owner)?;
    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&showings)?)?;
        return Ok(());
    }

    if showings.is_empty() {
        writeln!(writer, "No showings scheduled.")?;
        return Ok(());
    }
    for showing in &showings {
        writeln!(
            writer,
            "{}  {}  {:<10}  {}",
            showing.date(),
            format_span(showing),
            showing.property_id,
            showing.id
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{config, seed};

    use showings_core::ShowingInterval;

    #[test]
    fn list_reports_empty_schedule() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(temp.path());

        let mut output = Vec::new();
        run(&mut output, &ListArgs { json: false }, &config).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "No showings scheduled.\n");
    }

    #[test]
    fn list_orders_by_start_and_hides_other_owners() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(temp.path());
        let late = seed(&config, "oak-3", "2025-03-02T14:00:00Z", "2025-03-02T15:00:00Z");
        let early = seed(
            &config,
            "maple-12",
            "2025-03-02T09:00:00Z",
            "2025-03-02T09:30:00Z",
        );
        seed(&config, "birch-7", "2025-03-02T10:00:00Z", "2025-03-02T11:00:00Z");

        let mut output = Vec::new();
        run(&mut output, &ListArgs { json: false }, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                format!("2025-03-02  09:00-09:30  maple-12    {}", early.id),
                format!("2025-03-02  14:00-15:00  oak-3       {}", late.id),
            ]
        );
    }

    #[test]
    fn list_json_round_trips_records() {
        let temp = tempfile::tempdir().unwrap();
        let config = config(temp.path());
        let seeded = seed(
            &config,
            "maple-12",
            "2025-03-02T09:00:00Z",
            "2025-03-02T09:30:00Z",
        );

        let mut output = Vec::new();
        run(&mut output, &ListArgs { json: true }, &config).unwrap();

        let parsed: Vec<ShowingInterval> = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed, vec![seeded]);
    }
}
