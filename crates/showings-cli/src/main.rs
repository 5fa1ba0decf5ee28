use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use showings_cli::commands::{coalesce, create, delete, list, properties, select, slots, week};
use showings_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays clean
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let mut config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(owner) = &cli.owner {
        config.owner = Some(owner.clone());
    }
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = std::io::stdout().lock();
    match command {
        Commands::Properties => properties::run(&mut stdout, &config)?,
        Commands::Slots => slots::run(&mut stdout, &config)?,
        Commands::List(args) => list::run(&mut stdout, args, &config)?,
        Commands::Week(args) => week::run(&mut stdout, args, &config)?,
        Commands::Create(args) => create::run(&mut stdout, args, &config)?,
        Commands::Delete(args) => delete::run(&mut stdout, args, &config)?,
        Commands::Select(args) => select::run(&mut stdout, args, &config)?,
        Commands::Coalesce(args) => coalesce::run(&mut stdout, args, &config)?,
    }

    Ok(())
}
