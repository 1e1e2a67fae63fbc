//! `earsmith` CLI entrypoint.

use clap::Parser;
use earsmith_packager::cli::Cli;
use earsmith_packager::logging;
use earsmith_packager::run::{exit_code_for_run_result, run};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbosity, cli.quiet);
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let exit_code = exit_code_for_run_result(run(&cli, &mut stdout), &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}
