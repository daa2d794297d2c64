//! Log verbosity flags.
//!
//! `-v` can be repeated to raise the level one step at a time. `--log-level`
//! (or `CODEMART_LOG_LEVEL`) names the level directly and wins over the count.

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use tracing::Level;

pub const ARG_VERBOSE: &str = "verbose";
pub const ARG_LOG_LEVEL: &str = "log-level";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_VERBOSE)
                .short('v')
                .long("verbose")
                .help("Raise verbosity: -v warn, -vv info, -vvv debug, -vvvv trace")
                .global(true)
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new(ARG_LOG_LEVEL)
                .long("log-level")
                .help("Log level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("CODEMART_LOG_LEVEL")
                .global(true)
                .value_parser(value_parser!(Level)),
        )
}

/// Resolve the requested level. `None` leaves the subscriber default (errors).
#[must_use]
pub fn level(matches: &ArgMatches) -> Option<Level> {
    if let Some(level) = matches.get_one::<Level>(ARG_LOG_LEVEL) {
        return Some(*level);
    }

    match matches.get_count(ARG_VERBOSE) {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}
