use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;
use throttle_lib::CRITICAL_TARGET;

use crate::verbosity::Verbosity;

/// Initialize the logging system with the given verbosity level.
pub(crate) fn init_logging(verbose: &Verbosity) {
    // Set a base level for all modules to `warn`, which is a reasonable default.
    // It will be overridden by RUST_LOG if it's set.
    let env = Env::default().filter_or("RUST_LOG", "warn");

    let mut builder = Builder::from_env(env);

    if std::env::var("RUST_LOG").is_err() {
        // Adjust the base log level filter based on the verbosity from CLI.
        // This applies to all modules not explicitly mentioned in RUST_LOG.
        let level_filter = verbose.log_level_filter();

        builder.filter_level(LevelFilter::Warn);

        // Our own crates follow `-v`/`-q`, including the critical target.
        builder
            .filter_module("throttle", level_filter)
            .filter_module("throttle_lib", level_filter);
    }

    builder.format(|buf, record| {
        // `log` stops at `error`; critical events are told apart by target
        if record.target() == CRITICAL_TARGET {
            writeln!(buf, "[CRITICAL] {}", record.args())
        } else {
            writeln!(buf, "[{}] {}", record.level(), record.args())
        }
    });

    builder.init();
}
