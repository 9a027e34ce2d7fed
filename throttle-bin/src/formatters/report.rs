use anyhow::Result;
use serde_json::json;
use throttle_lib::admission::terminal_status;
use throttle_lib::scope::ScopeConfigs;
use throttle_lib::{AdmissionRequest, Decision, ErrorKind};

/// Turns command results into the text printed on stdout
pub(crate) trait ReportFormatter {
    /// Describe the effective scope configuration
    fn format_scopes(&self, scopes: &ScopeConfigs) -> Result<String>;

    /// Describe the outcome of an admission check
    fn format_decision(
        &self,
        request: &AdmissionRequest,
        outcome: &std::result::Result<Decision, ErrorKind>,
    ) -> Result<String>;
}

/// One line per scope or decision, for terminals and scripts alike
pub(crate) struct PlainFormatter;

impl ReportFormatter for PlainFormatter {
    fn format_scopes(&self, scopes: &ScopeConfigs) -> Result<String> {
        let mut lines = vec![format!("server_limit = {}", scopes.server_limit())];
        for (location, config) in scopes.iter() {
            let mut line = format!(
                "{location} [{}] max {}",
                config.limited_methods(),
                config.max_concurrent()
            );
            if config.is_inert() {
                line.push_str(" (inert)");
            }
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }

    fn format_decision(
        &self,
        request: &AdmissionRequest,
        outcome: &std::result::Result<Decision, ErrorKind>,
    ) -> Result<String> {
        let mut line = match outcome {
            Ok(decision) => format!("{request}: {decision}"),
            Err(e) => format!("{request}: error: {e}"),
        };
        if let Some(status) = terminal_status(outcome) {
            line.push_str(&format!(" [{status}]"));
        }
        Ok(line)
    }
}

/// Pretty-printed JSON documents
pub(crate) struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format_scopes(&self, scopes: &ScopeConfigs) -> Result<String> {
        Ok(serde_json::to_string_pretty(scopes)?)
    }

    fn format_decision(
        &self,
        request: &AdmissionRequest,
        outcome: &std::result::Result<Decision, ErrorKind>,
    ) -> Result<String> {
        let mut report = match outcome {
            Ok(decision) => serde_json::to_value(decision)?,
            Err(e) => json!({ "decision": "error", "error": e }),
        };
        if let Some(fields) = report.as_object_mut() {
            fields.insert("method".into(), json!(request.method.to_string()));
            fields.insert("url".into(), json!(request.url));
            fields.insert(
                "status".into(),
                json!(terminal_status(outcome).map(|status| status.as_u16())),
            );
        }
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;
    use throttle_lib::{MethodId, Rejection};

    fn request() -> AdmissionRequest {
        AdmissionRequest::new(MethodId::Get, "/api/x")
    }

    fn rejected() -> Decision {
        Decision::Reject(Rejection {
            url: "/api/x".into(),
            max_concurrent: 2,
            active: 2,
        })
    }

    #[test]
    fn test_plain_scopes() {
        let scopes = ScopeConfigs::from_str(
            "server_limit = 8\n[scopes.\"/api\"]\nmethods = \"POST GET\"\nmax_concurrent_reqs = 2\n[scopes.\"/static\"]\n",
        )
        .unwrap();
        assert_eq!(
            PlainFormatter.format_scopes(&scopes).unwrap(),
            "server_limit = 8\n/api [GET POST] max 2\n/static [] max 8 (inert)"
        );
    }

    #[test]
    fn test_plain_decisions() {
        assert_eq!(
            PlainFormatter
                .format_decision(&request(), &Ok(Decision::Admit))
                .unwrap(),
            "GET /api/x: admit"
        );
        assert_eq!(
            PlainFormatter
                .format_decision(&request(), &Ok(rejected()))
                .unwrap(),
            "GET /api/x: reject: concurrency ceiling reached \
             (client access to /api/x deferred, MaxConcurrentReqs 2 reached) \
             [503 Service Unavailable]"
        );
        assert_eq!(
            PlainFormatter
                .format_decision(&request(), &Err(ErrorKind::SnapshotUnavailable))
                .unwrap(),
            "GET /api/x: error: Server status unavailable in inetd mode \
             [500 Internal Server Error]"
        );
    }

    #[test]
    fn test_json_decisions() {
        let report = JsonFormatter
            .format_decision(&request(), &Ok(rejected()))
            .unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&report).unwrap(),
            json!({
                "decision": "reject",
                "url": "/api/x",
                "max_concurrent": 2,
                "active": 2,
                "method": "GET",
                "status": 503,
            })
        );

        let report = JsonFormatter
            .format_decision(&request(), &Err(ErrorKind::SnapshotUnavailable))
            .unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&report).unwrap(),
            json!({
                "decision": "error",
                "error": "Server status unavailable in inetd mode",
                "method": "GET",
                "url": "/api/x",
                "status": 500,
            })
        );
    }
}
