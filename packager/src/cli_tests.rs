//! Tests for CLI parsing and default behaviours.

use super::*;
use rstest::rstest;

#[test]
fn cli_parses_defaults() {
    let cli = Cli::parse_from(["earsmith"]);
    assert!(cli.command.is_none());
    assert_eq!(cli.command(), Command::Assemble);
    assert_eq!(cli.config, Utf8PathBuf::from("earsmith.toml"));
    assert_eq!(cli.verbosity, 0);
    assert!(!cli.quiet);
}

#[test]
fn cli_parses_modules_with_json() {
    let cli = Cli::parse_from(["earsmith", "modules", "--json"]);
    assert_eq!(cli.command(), Command::Modules(ModulesArgs { json: true }));
}

#[rstest]
#[case::before_subcommand(&["earsmith", "--config", "ear.toml", "assemble"])]
#[case::after_subcommand(&["earsmith", "assemble", "-c", "ear.toml"])]
fn config_is_global(#[case] args: &[&str]) {
    let cli = Cli::parse_from(args);
    assert_eq!(cli.config, Utf8PathBuf::from("ear.toml"));
    assert_eq!(cli.command(), Command::Assemble);
}

#[rstest]
#[case::single(&["earsmith", "-v"], 1)]
#[case::double(&["earsmith", "-vv"], 2)]
#[case::long(&["earsmith", "--verbose", "--verbose"], 2)]
fn verbosity_counts(#[case] args: &[&str], #[case] expected: u8) {
    assert_eq!(Cli::parse_from(args).verbosity, expected);
}

#[test]
fn quiet_conflicts_with_verbose() {
    assert!(Cli::try_parse_from(["earsmith", "-q", "-v"]).is_err());
}

#[test]
fn unknown_subcommands_are_rejected() {
    assert!(Cli::try_parse_from(["earsmith", "deploy"]).is_err());
}
