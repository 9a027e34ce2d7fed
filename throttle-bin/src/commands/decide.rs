use std::io::{self, Write};

use anyhow::{Result, bail};
use throttle_lib::scope::ScopeConfigs;
use throttle_lib::snapshot::{ScoreboardFile, SnapshotProvider, Unavailable};
use throttle_lib::{AdmissionRequest, Decision, ErrorKind, MethodId, Throttle};

use crate::ExitCode;
use crate::formatters::report::ReportFormatter;
use crate::options::DecideOptions;

/// Decide on a single request against the configured worker state
pub(crate) fn decide(
    scopes: ScopeConfigs,
    opts: &DecideOptions,
    formatter: &dyn ReportFormatter,
) -> Result<ExitCode> {
    let provider: Box<dyn SnapshotProvider> = match &opts.scoreboard {
        Some(path) if !opts.inetd => {
            log::debug!("Reading worker state from `{}`", path.display());
            Box::new(ScoreboardFile::new(path))
        }
        _ => Box::new(Unavailable),
    };
    let throttle = Throttle::new(scopes, provider);

    let request = AdmissionRequest::new(
        MethodId::from_token(&opts.method),
        request_path(&opts.path),
    );
    let outcome = throttle.check(&request);

    let exit_code = match &outcome {
        Ok(Decision::Admit) => ExitCode::Success,
        Ok(Decision::Reject(_)) => ExitCode::Rejected,
        Err(ErrorKind::SnapshotUnavailable) => ExitCode::SnapshotUnavailable,
        Err(e) => bail!("Cannot decide on `{request}`: {e}"),
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", formatter.format_decision(&request, &outcome)?)?;
    Ok(exit_code)
}

/// The path component of a request target; the query string never counts
fn request_path(target: &str) -> &str {
    target.split_once('?').map_or(target, |(path, _)| path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_path() {
        assert_eq!(request_path("/api/x?page=2"), "/api/x");
        assert_eq!(request_path("/api/x"), "/api/x");
        assert_eq!(request_path("?q"), "");
    }
}
