//! Read-only inspection of the host.
//!
//! [`run`] gathers platform, shell, tool, service and environment checks into
//! a [`DetectionReport`]. Nothing here changes the system.

mod env;
mod prereqs;
mod services;
mod system;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use env::{EnvVarCheck, EnvVarSpec, ENV_VARS, check_env_vars, is_sensitive_name, mask_value};
pub use prereqs::{PrereqCheck, check_prereqs};
pub use services::{ServiceCheck, check_services, service_from_health};
pub use system::{PlatformCheck, ShellCheck, check_platform, check_shell};

use crate::config::HiveConfig;
use crate::error::HiveError;
use crate::platform::Platform;

/// State of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Unknown,
    Ok,
    Warning,
    Error,
    Missing,
}

impl Status {
    /// One-character indicator used in terminal output.
    pub fn symbol(self) -> &'static str {
        match self {
            Status::Ok => "✓",
            Status::Warning => "!",
            Status::Error | Status::Missing => "✗",
            Status::Unknown => "?",
        }
    }

    /// Whether this status counts against readiness.
    pub fn is_failure(self) -> bool {
        !matches!(self, Status::Ok | Status::Warning)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Unknown => "unknown",
            Status::Ok => "ok",
            Status::Warning => "warning",
            Status::Error => "error",
            Status::Missing => "missing",
        };
        f.write_str(label)
    }
}

/// Counts of passed, warning and failed checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub ok: usize,
    pub warn: usize,
    pub fail: usize,
}

impl Summary {
    pub fn tally(statuses: impl IntoIterator<Item = Status>) -> Self {
        statuses
            .into_iter()
            .fold(Summary::default(), |mut acc, status| {
                match status {
                    Status::Ok => acc.ok += 1,
                    Status::Warning => acc.warn += 1,
                    _ => acc.fail += 1,
                }
                acc
            })
    }
}

/// Everything [`run`] found out about the host.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub platform: PlatformCheck,
    pub shell: ShellCheck,
    pub prereqs: Vec<PrereqCheck>,
    pub services: Vec<ServiceCheck>,
    pub env_vars: Vec<EnvVarCheck>,
}

impl DetectionReport {
    fn statuses(&self) -> impl Iterator<Item = Status> + '_ {
        [self.platform.status, self.shell.status]
            .into_iter()
            .chain(self.prereqs.iter().map(|c| c.status))
            .chain(self.services.iter().map(|c| c.status))
            .chain(self.env_vars.iter().map(|c| c.status))
    }

    pub fn summary(&self) -> Summary {
        Summary::tally(self.statuses())
    }

    /// True when no check failed. Warnings do not block setup.
    pub fn is_ready(&self) -> bool {
        self.summary().fail == 0
    }
}

/// Runs every detection check against the live system.
///
/// ## Errors
///
/// Fails only if a built-in version pattern is invalid.
pub fn run(config: &HiveConfig, platform: &Platform) -> Result<DetectionReport, HiveError> {
    tracing::debug!(%platform, "Running detection");

    Ok(DetectionReport {
        platform: check_platform(platform),
        shell: check_shell(
            std::env::var("SHELL").ok().as_deref(),
            dirs::home_dir().as_deref(),
        ),
        prereqs: check_prereqs()?,
        services: check_services(config),
        env_vars: check_env_vars(|key| std::env::var(key).ok()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(prereq: Status, service: Status) -> DetectionReport {
        DetectionReport {
            platform: PlatformCheck {
                status: Status::Ok,
                os: "linux".to_string(),
                distro: Some("debian".to_string()),
                version: None,
                package_manager: Some("apt".to_string()),
                arch: "x86_64".to_string(),
            },
            shell: ShellCheck {
                status: Status::Warning,
                name: "fish".to_string(),
                version: None,
                config_file: None,
            },
            prereqs: vec![PrereqCheck {
                status: prereq,
                name: "Git".to_string(),
                version: Some("2.43.0".to_string()),
                required: "2.0.0".to_string(),
                fix_hint: String::new(),
            }],
            services: vec![ServiceCheck {
                status: service,
                name: "Chroma".to_string(),
                endpoint: Some("localhost:8000".to_string()),
                message: None,
            }],
            env_vars: Vec::new(),
        }
    }

    #[test]
    fn test_status_symbols() {
        assert_eq!(Status::Ok.symbol(), "✓");
        assert_eq!(Status::Warning.symbol(), "!");
        assert_eq!(Status::Error.symbol(), "✗");
        assert_eq!(Status::Missing.symbol(), "✗");
        assert_eq!(Status::Unknown.symbol(), "?");
    }

    #[test]
    fn test_summary_counts_unknown_as_failure() {
        let summary = Summary::tally([Status::Ok, Status::Warning, Status::Unknown, Status::Missing]);
        assert_eq!(summary, Summary { ok: 1, warn: 1, fail: 2 });
    }

    #[test]
    fn test_report_ready_with_warnings() {
        let report = report(Status::Ok, Status::Ok);
        assert_eq!(report.summary(), Summary { ok: 3, warn: 1, fail: 0 });
        assert!(report.is_ready());
    }

    #[test]
    fn test_report_not_ready_with_missing_service() {
        let report = report(Status::Ok, Status::Missing);
        assert!(!report.is_ready());
        assert_eq!(report.summary().fail, 1);
    }

    #[test]
    fn test_report_serializes_lowercase_status() {
        let json = serde_json::to_value(report(Status::Warning, Status::Ok)).unwrap();
        assert_eq!(json["prereqs"][0]["status"], "warning");
        assert_eq!(json["shell"]["name"], "fish");
    }
}
