use crate::verbosity::Verbosity;
use anyhow::{Error, anyhow};
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand, builder::TypedValueParser};
use const_format::formatcp;
use std::{path::PathBuf, str::FromStr};
use strum::{Display, VariantNames};
use throttle_lib::scope::THROTTLE_CONFIG_FILE;

// We use a custom help message here because we want to show the default
// value of the config file, but also be able to check if the user has
// provided a custom value. If they didn't, we won't throw an error if
// the file doesn't exist.
const HELP_MSG_CONFIG_FILE: &str = formatcp!(
    "Scope configuration file to use\n\n[default: {}]",
    THROTTLE_CONFIG_FILE,
);

/// The format to print reports in
#[derive(Debug, Default, Clone, Copy, Display, VariantNames, PartialEq, Eq)]
#[non_exhaustive]
#[strum(serialize_all = "snake_case")]
pub(crate) enum OutputFormat {
    /// One human-readable line per item
    #[default]
    Plain,
    /// A single JSON document
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format.to_lowercase().as_str() {
            "plain" | "text" => Ok(OutputFormat::Plain),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format {format}")),
        }
    }
}

/// Check how many concurrent requests a URL scope admits
#[derive(Parser, Debug)]
#[command(version, about, next_display_order = None)]
pub(crate) struct ThrottleOptions {
    /// Configuration file to use
    #[arg(short, long = "config", env = "THROTTLE_CONFIG", global = true)]
    #[arg(help = HELP_MSG_CONFIG_FILE)]
    pub(crate) config_file: Option<PathBuf>,

    /// Output format of the report
    #[arg(
        short,
        long,
        global = true,
        default_value_t = OutputFormat::default(),
        value_parser = PossibleValuesParser::new(OutputFormat::VARIANTS)
            .map(|s| s.parse::<OutputFormat>().unwrap_or_default())
    )]
    pub(crate) format: OutputFormat,

    #[command(flatten)]
    pub(crate) verbose: Verbosity,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Validate the scope configuration and print the effective scopes
    Check,

    /// Decide whether a request would be admitted right now
    #[command(
        long_about = "Decide whether a request would be admitted right now.

Every worker of the scoreboard that serves a limited method on a URL starting
with PATH counts against the ceiling of the scope governing PATH.

Exit codes: 0 admitted, 2 rejected, 4 worker state unavailable."
    )]
    Decide(DecideOptions),
}

#[derive(Args, Debug)]
pub(crate) struct DecideOptions {
    /// Method of the request, e.g. `GET`
    pub(crate) method: String,

    /// URL path of the request, e.g. `/api/items`
    pub(crate) path: String,

    /// JSON dump of the worker state table
    #[arg(
        long,
        env = "THROTTLE_SCOREBOARD",
        value_name = "FILE",
        required_unless_present = "inetd"
    )]
    pub(crate) scoreboard: Option<PathBuf>,

    /// Decide as a server started without shared worker state.
    /// Takes precedence over `--scoreboard`.
    #[arg(long)]
    pub(crate) inetd: bool,
}
