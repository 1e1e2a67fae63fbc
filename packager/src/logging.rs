//! Log output for the CLI.
//!
//! The library logs through the `log` facade; records are forwarded to a
//! `tracing-subscriber` formatter on stderr.

use log::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable that overrides the verbosity flags.
pub const LOG_ENV: &str = "RUST_LOG";

/// Return the default filter directive for the given flags.
#[must_use]
pub const fn default_directive(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Build the filter, preferring `RUST_LOG` when it is set.
#[must_use]
pub fn filter(verbosity: u8, quiet: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity, quiet)))
}

/// Install the global subscriber. A second call keeps the first one.
pub fn init(verbosity: u8, quiet: bool) {
    if let Err(err) = tracing_subscriber::registry()
        .with(filter(verbosity, quiet))
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()
    {
        debug!(target: "packager", "keeping the installed log subscriber: {err}");
    }
}
