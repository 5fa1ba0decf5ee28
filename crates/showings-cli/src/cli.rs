//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::coalesce::CoalesceArgs;
use crate::commands::create::CreateArgs;
use crate::commands::delete::DeleteArgs;
use crate::commands::list::ListArgs;
use crate::commands::select::SelectArgs;
use crate::commands::week::WeekArgs;

/// Showing availability scheduler.
///
/// Owners publish the windows in which their properties can be shown.
/// Windows of one property never overlap, and touching windows are merged.
#[derive(Debug, Parser)]
#[command(name = "showings", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Act as this owner instead of the configured one.
    #[arg(long, global = true)]
    pub owner: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the properties the owner may schedule.
    Properties,

    /// Print the slots of the day grid.
    Slots,

    /// List every showing of the owner's properties.
    List(ListArgs),

    /// Show one Sunday-to-Saturday week.
    Week(WeekArgs),

    /// Schedule a showing window.
    Create(CreateArgs),

    /// Delete a showing window.
    Delete(DeleteArgs),

    /// Replay a drag selection on the day grid and commit it.
    Select(SelectArgs),

    /// Merge touching showing windows.
    Coalesce(CoalesceArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_create_with_global_flags() {
        let cli = Cli::try_parse_from([
            "showings",
            "create",
            "--property",
            "maple-12",
            "--date",
            "2025-03-02",
            "--start",
            "10:00",
            "--end",
            "11:00",
            "--owner",
            "alice",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.owner.as_deref(), Some("alice"));
        let Some(Commands::Create(args)) = cli.command else {
            panic!("expected create command");
        };
        assert_eq!(args.property, "maple-12");
        assert_eq!(args.start, "10:00");
    }

    #[test]
    fn week_date_is_optional() {
        let cli = Cli::try_parse_from(["showings", "week", "--json"]).unwrap();
        let Some(Commands::Week(args)) = cli.command else {
            panic!("expected week command");
        };
        assert!(args.date.is_none());
        assert!(args.json);
    }
}
