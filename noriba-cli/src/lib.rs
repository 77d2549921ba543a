//! Command-line interface for loading and querying GTFS-JP feeds.
#![forbid(unsafe_code)]

use std::io::{self, Write};

use clap::{Parser, Subcommand};

mod error;
mod load;
mod progress;
mod query;

pub use error::CliError;
use load::LoadArgs;
use query::{AgencyArgs, StopArgs};

pub(crate) const ARG_FEED_DIR: &str = "feed-dir";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_ENCODING: &str = "encoding";
pub(crate) const ARG_DROP_DUPLICATES: &str = "drop-duplicates";
pub(crate) const ENV_FEED_DIR: &str = "NORIBA_CMDS_LOAD_FEED_DIR";
/// Store used when no database or source is given.
pub(crate) const DEFAULT_STORE: &str = "gtfs-jp.sqlite3";

/// Run the Noriba CLI with the current process arguments and environment.
///
/// Result documents go to stdout.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli.command, &mut out)
}

fn execute(command: Command, out: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Load(args) => load::run_load(args).map(|_| ()),
        Command::Agency(args) => query::run_agency(&args, out),
        Command::Stop(args) => query::run_stop(&args, out),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "noriba",
    about = "Load GTFS-JP feeds into SQLite and look up stops and agencies",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rebuild a store from a feed directory.
    Load(LoadArgs),
    /// Print every agency.
    Agency(AgencyArgs),
    /// Look up a stop by id or search stops by name.
    Stop(StopArgs),
}

#[cfg(test)]
mod tests;
