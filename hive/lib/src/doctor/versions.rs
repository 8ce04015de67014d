use super::CheckResult;
use crate::detect::{Status, is_sensitive_name, mask_value};
use crate::error::HiveError;
use crate::version::{TOOLS, ToolSpec, VersionProbe};

/// Turns a version probe into a check. Missing tools are errors and old or
/// unreadable versions are warnings.
pub fn version_check(tool: &ToolSpec, probe: VersionProbe) -> CheckResult {
    let min = tool.min_version;
    let check = match probe {
        VersionProbe::Missing => CheckResult::new(tool.name, Status::Error, "not installed")
            .with_details(format!("Requires {} {min}+", tool.name)),
        VersionProbe::Unknown => CheckResult::new(tool.name, Status::Warning, "version unknown")
            .with_details("Could not parse version output"),
        VersionProbe::Found {
            version,
            meets_minimum: true,
        } => CheckResult::new(tool.name, Status::Ok, format!("v{version} (>= {min})")),
        VersionProbe::Found {
            version,
            meets_minimum: false,
        } => CheckResult::new(
            tool.name,
            Status::Warning,
            format!("v{version} (requires {min}+)"),
        )
        .with_details(format!(
            "Installed version {version} is below minimum {min}"
        )),
    };
    check.with_hint(tool.fix_hint)
}

pub fn check_versions() -> Result<Vec<CheckResult>, HiveError> {
    TOOLS
        .iter()
        .map(|tool| Ok(version_check(tool, tool.probe()?)))
        .collect()
}

const DOCTOR_ENV_VARS: [(&str, bool, &str); 3] = [
    (
        "HIVE_MCP_DIR",
        true,
        "Add to shell config: export HIVE_MCP_DIR=$HOME/hive-mcp",
    ),
    (
        "BB_MCP_DIR",
        true,
        "Add to shell config: export BB_MCP_DIR=$HOME/hive-mcp",
    ),
    (
        "OPENROUTER_API_KEY",
        false,
        "Get API key from https://openrouter.ai and add to shell config",
    ),
];

/// Checks one variable. Values of credential-like names are masked.
pub fn env_check(name: &str, required: bool, hint: &str, value: Option<&str>) -> CheckResult {
    let check = match value.filter(|v| !v.is_empty()) {
        Some(value) => {
            let shown = if is_sensitive_name(name) {
                mask_value(value)
            } else {
                value.to_string()
            };
            CheckResult::new(name, Status::Ok, shown)
        }
        None if required => CheckResult::new(name, Status::Error, "not set (required)"),
        None => CheckResult::new(name, Status::Warning, "not set (optional)"),
    };
    check.with_hint(hint)
}

pub fn check_env_vars<F>(lookup: F) -> Vec<CheckResult>
where
    F: Fn(&str) -> Option<String>,
{
    DOCTOR_ENV_VARS
        .iter()
        .map(|(name, required, hint)| env_check(name, *required, hint, lookup(name).as_deref()))
        .collect()
}
