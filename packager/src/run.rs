//! Command dispatch.

use crate::cli::{Cli, Command, ModulesArgs};
use crate::listing::{format_human, format_json};
use earsmith::{AssemblyReport, BuildConfig, ConfiguredDependencies, Result, assemble, plan_modules};
use log::{debug, info};
use std::io::{self, Write};

/// Run the command selected by `cli`, writing user-facing output to `out`.
///
/// # Errors
///
/// Returns configuration, assembly and output errors.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let config = BuildConfig::load(&cli.config)?;
    let provider = ConfiguredDependencies::from_config(&config);
    match cli.command() {
        Command::Assemble => {
            let report = assemble(&config, &provider)?;
            writeln!(out, "{}", summary(&report))?;
        }
        Command::Modules(ModulesArgs { json }) => {
            let (_, modules) = plan_modules(&config, &provider)?;
            let text = if json {
                format_json(&modules).map_err(io::Error::from)?
            } else {
                format_human(&modules)
            };
            writeln!(out, "{text}")?;
        }
    }
    Ok(())
}

/// One-line summary of a finished build.
#[must_use]
pub fn summary(report: &AssemblyReport) -> String {
    let deleted = report.deleted.len();
    if deleted > 0 {
        info!(target: "packager", "removed {deleted} stale file(s)");
    }
    format!(
        "Built {} ({} module(s), {} file(s))",
        report.archive,
        report.placements.len(),
        report.archived_files
    )
}

/// Map a run result to a process exit code, reporting any error.
#[must_use]
pub fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_error_chain(stderr, &err);
            1
        }
    }
}

fn write_error_chain(stderr: &mut dyn Write, err: &dyn std::error::Error) {
    let mut message = format!("error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!("\n  caused by: {cause}"));
        source = cause.source();
    }
    if let Err(write_err) = writeln!(stderr, "{message}") {
        debug!(target: "packager", "could not report the failure: {write_err}");
    }
}
