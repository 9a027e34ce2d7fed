//! `throttle` inspects concurrent request ceilings from the command line.
//!
//! The binary is a wrapper around throttle-lib. It validates scope
//! configurations and answers, for a given worker state, whether a request
//! would be admitted or turned away with `503 Service Unavailable`.
//!
//! Validate the scope configuration in the current directory:
//! ```sh
//! throttle check
//! ```
//!
//! Validate another file and print the effective scopes as JSON:
//! ```sh
//! throttle --config conf/throttle.toml --format json check
//! ```
//!
//! Decide on a request against a scoreboard dump:
//! ```sh
//! throttle decide --scoreboard scoreboard.json GET /api/items
//! ```
//!
//! Decide as a server without shared worker state (always an error):
//! ```sh
//! throttle decide --inetd GET /api/items
//! ```
#![warn(clippy::all, clippy::pedantic)]
#![warn(
    absolute_paths_not_starting_with_crate,
    rustdoc::invalid_html_tags,
    missing_copy_implementations,
    missing_debug_implementations,
    semicolon_in_expressions_from_macros,
    unreachable_pub,
    unused_extern_crates,
    variant_size_differences,
    clippy::missing_const_for_fn
)]
#![deny(anonymous_parameters, macro_use_extern_crate)]
#![deny(missing_docs)]

use std::io;
use std::path::PathBuf;

use anyhow::{Error, Result, bail};
use clap::Parser;
use log::error;
use throttle_lib::scope::{ScopeConfigs, THROTTLE_CONFIG_FILE};

mod commands;
mod formatters;
mod options;
mod verbosity;

use crate::formatters::log::init_logging;
use crate::options::{Command, ThrottleOptions};

/// A C-like enum that can be cast to `i32` and used as process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitCode {
    Success = 0,
    // NOTE: exit code 1 is used for any `Result::Err` bubbled up to `main()`
    // using the `?` operator, e.g. an unreadable scoreboard dump, and for
    // usage errors, which must not read as a rejection.
    UnexpectedFailure = 1,
    Rejected = 2,
    ConfigFile = 3,
    SnapshotUnavailable = 4,
}

fn main() -> Result<()> {
    // std::process::exit doesn't guarantee that all destructors will be run,
    // therefore we wrap the main code in another function to ensure that.
    // See: https://doc.rust-lang.org/stable/std/process/fn.exit.html
    let exit_code = run_main()?;
    std::process::exit(exit_code);
}

/// Load the scope configuration.
/// An explicitly given file must exist, the default one is optional.
fn load_config(opts: &ThrottleOptions) -> Result<ScopeConfigs> {
    if let Some(config_file) = &opts.config_file {
        return match ScopeConfigs::load_from_file(config_file) {
            Ok(scopes) => Ok(scopes),
            Err(e) => bail!(
                "Cannot load configuration file `{}`: {e}",
                config_file.display()
            ),
        };
    }

    // If no config file was explicitly provided, we try to load the default
    // config file from the current directory if the file exists. This will
    // raise an error if the file is invalid, just like an explicitly provided
    // config file.
    let default_config = PathBuf::from(THROTTLE_CONFIG_FILE);
    if default_config.is_file() {
        return match ScopeConfigs::load_from_file(&default_config) {
            Ok(scopes) => Ok(scopes),
            Err(e) => bail!(
                "Cannot load default configuration file `{}`: {e}",
                default_config.display()
            ),
        };
    }

    log::debug!("No configuration file, no scope is limited");
    Ok(ScopeConfigs::default())
}

/// Parse options, set up logging and run the selected command
fn run_main() -> Result<i32> {
    use std::process::exit;

    let opts = match ThrottleOptions::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            e.print()?;
            let exit_code = if e.use_stderr() {
                ExitCode::UnexpectedFailure
            } else {
                // `--help` and `--version`
                ExitCode::Success
            };
            exit(exit_code as i32);
        }
    };
    init_logging(&opts.verbose);

    let scopes = match load_config(&opts) {
        Ok(scopes) => scopes,
        Err(e) => {
            error!("Error while loading config: {e}");
            exit(ExitCode::ConfigFile as i32);
        }
    };

    match run(&opts, scopes) {
        Err(e) if Some(io::ErrorKind::BrokenPipe) == underlying_io_error_kind(&e) => {
            exit(ExitCode::Success as i32);
        }
        res => res,
    }
}

/// Check if the given error can be traced back to an `io::ErrorKind`
/// This is helpful for troubleshooting the root cause of an error.
/// Code is taken from the anyhow documentation.
fn underlying_io_error_kind(error: &Error) -> Option<io::ErrorKind> {
    for cause in error.chain() {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            return Some(io_error.kind());
        }
    }
    None
}

/// Run the selected command with the loaded scopes
fn run(opts: &ThrottleOptions, scopes: ScopeConfigs) -> Result<i32> {
    let formatter = formatters::get_report_formatter(opts.format);

    let exit_code = match &opts.command {
        Command::Check => commands::check(&scopes, formatter.as_ref())?,
        Command::Decide(decide) => commands::decide(scopes, decide, formatter.as_ref())?,
    };

    Ok(exit_code as i32)
}
