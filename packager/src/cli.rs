//! CLI argument definitions for the `earsmith` binary.
//!
//! Kept apart from the entrypoint so the argument surface can be tested
//! without running a build.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use earsmith::CONFIG_FILE_NAME;

/// Assemble enterprise archives.
#[derive(Parser, Debug)]
#[command(name = "earsmith")]
#[command(version, about)]
#[command(long_about = concat!(
    "Assemble an enterprise archive (EAR).\n\n",
    "Dependencies listed in the configuration file are classified into modules, ",
    "placed in the work directory, given a consistent manifest Class-Path and ",
    "zipped together with the application's loose resources.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Build the archive described by ./earsmith.toml:\n",
    "    $ earsmith\n\n",
    "  Use another configuration file:\n",
    "    $ earsmith --config build/ear.toml assemble\n\n",
    "  Show how dependencies were classified:\n",
    "    $ earsmith modules --json",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Configuration file.
    #[arg(short, long, global = true, value_name = "FILE", default_value = CONFIG_FILE_NAME)]
    pub config: Utf8PathBuf,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only report warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Assemble the archive (default when no subcommand is given).
    Assemble,

    /// List the classified modules without building.
    Modules(ModulesArgs),
}

/// Arguments for the modules command.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
pub struct ModulesArgs {
    /// Output in JSON format for scripting.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Return the requested command, defaulting to [`Command::Assemble`].
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Assemble)
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
