//! A `-v`/`-q` flag group for the log level
//!
//! By default only errors are reported.
//! - `-q` silences output
//! - `-v` shows warnings
//! - `-vv` shows info
//! - `-vvv` shows debug
//! - `-vvvv` shows trace

use log::Level;
use log::LevelFilter;

#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Verbosity {
    /// Pass many times for more log output
    ///
    /// By default, it'll only report errors. Passing `-v` one time also prints
    /// warnings, `-vv` enables info logging, `-vvv` debug, and `-vvvv` trace.
    #[arg(
        long,
        short = 'v',
        action = clap::ArgAction::Count,
        global = true,
        help = Self::verbose_help(),
        long_help = Self::verbose_long_help(),
        conflicts_with = "quiet",
    )]
    verbose: u8,

    #[arg(
        long,
        short = 'q',
        action = clap::ArgAction::Count,
        global = true,
        help = Self::quiet_help(),
        long_help = Self::quiet_long_help(),
        conflicts_with = "verbose",
    )]
    quiet: u8,
}

impl Verbosity {
    /// Get the log level.
    ///
    /// `None` means all output is disabled.
    pub(crate) const fn log_level(&self) -> Option<Level> {
        level_enum(self.verbosity())
    }

    /// Get the log level filter.
    pub(crate) fn log_level_filter(&self) -> LevelFilter {
        self.log_level()
            .map_or(LevelFilter::Off, |level| level.to_level_filter())
    }

    #[allow(clippy::cast_possible_wrap)]
    const fn verbosity(&self) -> i8 {
        level_value(Some(Level::Error)) - (self.quiet as i8) + (self.verbose as i8)
    }

    const fn verbose_help() -> &'static str {
        "More output per occurrence"
    }

    const fn verbose_long_help() -> Option<&'static str> {
        None
    }

    const fn quiet_help() -> &'static str {
        "Less output per occurrence"
    }

    const fn quiet_long_help() -> Option<&'static str> {
        None
    }
}

const fn level_value(level: Option<Level>) -> i8 {
    match level {
        None => -1,
        Some(Level::Error) => 0,
        Some(Level::Warn) => 1,
        Some(Level::Info) => 2,
        Some(Level::Debug) => 3,
        Some(Level::Trace) => 4,
    }
}

const fn level_enum(verbosity: i8) -> Option<Level> {
    match verbosity {
        i8::MIN..=-1 => None,
        0 => Some(Level::Error),
        1 => Some(Level::Warn),
        2 => Some(Level::Info),
        3 => Some(Level::Debug),
        _ => Some(Level::Trace),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Cli {
        #[clap(flatten)]
        verbose: Verbosity,
    }

    #[test]
    fn verify_app() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_log_level() {
        let verbosity = Verbosity::default();
        assert_eq!(verbosity.log_level(), Some(Level::Error));
        assert_eq!(verbosity.log_level_filter(), LevelFilter::Error);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from(["throttle", "-vv"]);
        assert_eq!(cli.verbose.log_level(), Some(Level::Info));

        let cli = Cli::parse_from(["throttle", "-vvvvvv"]);
        assert_eq!(cli.verbose.log_level(), Some(Level::Trace));

        let cli = Cli::parse_from(["throttle", "-q"]);
        assert_eq!(cli.verbose.log_level(), None);
        assert_eq!(cli.verbose.log_level_filter(), LevelFilter::Off);
    }
}
