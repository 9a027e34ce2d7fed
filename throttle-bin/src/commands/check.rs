use std::io::{self, Write};

use anyhow::Result;
use throttle_lib::scope::ScopeConfigs;

use crate::ExitCode;
use crate::formatters::report::ReportFormatter;

/// Print the scopes of a configuration that loaded successfully
pub(crate) fn check(scopes: &ScopeConfigs, formatter: &dyn ReportFormatter) -> Result<ExitCode> {
    log::info!(
        "Configuration is valid: {} scope(s), server limit {}",
        scopes.len(),
        scopes.server_limit()
    );
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", formatter.format_scopes(scopes)?)?;
    Ok(ExitCode::Success)
}
