//! MCP registration and end-to-end checks through the `claude` CLI.

use std::time::Duration;

use super::{CheckResult, Fix};
use crate::config::HiveConfig;
use crate::detect::Status;
use crate::error::StepError;
use crate::process::{CommandOutput, capture, capture_with_timeout};
use crate::setup::steps::{SERVER_MAIN, lists_server};

/// How long an MCP round trip may take before it counts as timed out.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

fn register_hint(config: &HiveConfig) -> String {
    format!(
        "Register with: claude mcp add {} -- bb --prn -cp {} -m {SERVER_MAIN}",
        config.mcp_server_name,
        config.hive_mcp_dir.join("bb.edn").display()
    )
}

/// Evaluates `claude mcp list` output for the configured server.
pub fn registration_check(
    config: &HiveConfig,
    output: Result<CommandOutput, StepError>,
) -> CheckResult {
    let name = &config.mcp_server_name;
    let check = match output {
        Ok(out) if out.success => {
            if lists_server(&out.combined(), name) {
                CheckResult::new(
                    "MCP Server Registration",
                    Status::Ok,
                    format!("{name} server registered"),
                )
            } else {
                CheckResult::new(
                    "MCP Server Registration",
                    Status::Error,
                    format!("{name} server not registered"),
                )
                .with_details(format!("Run 'hive doctor --fix' to register {name}"))
            }
        }
        Ok(out) => CheckResult::new(
            "MCP Server Registration",
            Status::Error,
            "failed to query MCP servers",
        )
        .with_details(out.combined().trim().to_string()),
        Err(err) => CheckResult::new(
            "MCP Server Registration",
            Status::Error,
            "failed to query MCP servers",
        )
        .with_details(err.to_string()),
    };
    check.with_hint(register_hint(config)).with_fix(Fix::RegisterMcp)
}

/// Evaluates `claude mcp list --json` output.
pub fn config_check(output: Result<CommandOutput, StepError>) -> CheckResult {
    let check = match output {
        Ok(out) if out.success => {
            match serde_json::from_str::<serde_json::Value>(&out.stdout) {
                Ok(_) => CheckResult::new("MCP Server Config", Status::Ok, "server config accessible"),
                Err(_) => CheckResult::new(
                    "MCP Server Config",
                    Status::Warning,
                    "could not parse server list",
                ),
            }
        }
        _ => CheckResult::new(
            "MCP Server Config",
            Status::Warning,
            "could not verify server config",
        ),
    };
    check.with_hint("Check ~/.config/claude-code/settings.json for MCP configuration")
}

pub fn check_mcp(config: &HiveConfig) -> Vec<CheckResult> {
    vec![
        registration_check(config, capture("claude", &["mcp", "list"])),
        config_check(capture("claude", &["mcp", "list", "--json"])),
    ]
}

/// Evaluates a bounded `claude mcp run <server> emacs_status`.
pub fn connection_check(output: Result<CommandOutput, StepError>) -> CheckResult {
    let check = match output {
        Ok(out) if out.success => CheckResult::new("Emacs MCP Connection", Status::Ok, "connected"),
        Err(StepError::Timeout { after, .. }) => CheckResult::new(
            "Emacs MCP Connection",
            Status::Warning,
            "connection timeout",
        )
        .with_details(format!(
            "MCP server did not respond within {} seconds",
            after.as_secs()
        )),
        _ => CheckResult::new("Emacs MCP Connection", Status::Warning, "connection failed")
            .with_details("MCP server may not be running"),
    };
    check.with_hint("Ensure Emacs daemon is running and hive-mcp.el is loaded")
}

/// Evaluates a `claude mcp run <server> mcp_capabilities` round trip.
pub fn tool_execution_check(output: Result<CommandOutput, StepError>) -> CheckResult {
    let check = match output {
        Ok(out) if out.success => {
            let text = out.combined();
            if text.contains("capabilities") || text.contains("hive-mcp") || text.len() > 10 {
                CheckResult::new("MCP Tool Execution", Status::Ok, "tools executing correctly")
            } else {
                CheckResult::new(
                    "MCP Tool Execution",
                    Status::Warning,
                    "unexpected tool response",
                )
                .with_details("Response may be empty or malformed")
            }
        }
        Ok(out) => CheckResult::new("MCP Tool Execution", Status::Warning, "tool execution failed")
            .with_details(out.combined().trim().to_string()),
        Err(err) => CheckResult::new("MCP Tool Execution", Status::Warning, "tool execution failed")
            .with_details(err.to_string()),
    };
    check.with_hint("Check MCP server logs for errors")
}

pub fn check_integration(config: &HiveConfig) -> Vec<CheckResult> {
    let server = config.mcp_server_name.as_str();
    vec![
        connection_check(capture_with_timeout(
            "claude",
            &["mcp", "run", server, "emacs_status"],
            CONNECTION_TIMEOUT,
        )),
        tool_execution_check(capture_with_timeout(
            "claude",
            &["mcp", "run", server, "mcp_capabilities"],
            CONNECTION_TIMEOUT,
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(success: bool, stdout: &str) -> Result<CommandOutput, StepError> {
        Ok(CommandOutput {
            success,
            stdout: stdout.to_string(),
            stderr: String::new(),
        })
    }

    #[test]
    fn test_registration_found() {
        let config = HiveConfig::default();
        let check = registration_check(&config, out(true, "emacs: bb --prn - ✓ Connected\n"));
        assert!(check.is_ok());
        assert_eq!(check.message, "emacs server registered");
    }

    #[test]
    fn test_registration_missing_is_fixable() {
        let config = HiveConfig::default();
        let check = registration_check(&config, out(true, "No MCP servers configured.\n"));
        assert_eq!(check.status, Status::Error);
        assert_eq!(check.fix, Some(Fix::RegisterMcp));
        assert!(check.fix_hint.unwrap().contains(SERVER_MAIN));
    }

    #[test]
    fn test_registration_query_failure() {
        let config = HiveConfig::default();
        let check = registration_check(
            &config,
            Err(StepError::Spawn {
                program: "claude".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        );
        assert_eq!(check.message, "failed to query MCP servers");
    }

    #[test]
    fn test_config_check_parses_json() {
        assert!(config_check(out(true, "[]")).is_ok());
        assert_eq!(
            config_check(out(true, "emacs: bb")).message,
            "could not parse server list"
        );
        assert_eq!(
            config_check(out(false, "")).message,
            "could not verify server config"
        );
    }

    #[test]
    fn test_connection_timeout_is_warning() {
        let check = connection_check(Err(StepError::Timeout {
            what: "claude mcp run emacs emacs_status".to_string(),
            after: CONNECTION_TIMEOUT,
        }));
        assert_eq!(check.status, Status::Warning);
        assert_eq!(check.message, "connection timeout");
        assert_eq!(
            check.details.as_deref(),
            Some("MCP server did not respond within 5 seconds")
        );
    }

    #[test]
    fn test_connection_failure() {
        let check = connection_check(out(false, ""));
        assert_eq!(check.message, "connection failed");
    }

    #[test]
    fn test_tool_execution_response() {
        assert!(tool_execution_check(out(true, "{\"capabilities\":{}}")).is_ok());
        let short = tool_execution_check(out(true, "ok"));
        assert_eq!(short.message, "unexpected tool response");
    }
}
