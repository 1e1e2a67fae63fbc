//! Command-line front end for earsmith.
//!
//! The `earsmith` binary loads `earsmith.toml`, takes the dependencies it
//! lists as resolved, and either assembles the archive or lists the
//! classified modules.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`listing`] - Output formatting for the module listing
//! - [`logging`] - Log subscriber installation
//! - [`run`] - Command dispatch

pub mod cli;
pub mod listing;
pub mod logging;
pub mod run;
