//! Health checks for an existing hive-mcp installation.
//!
//! [`run`] groups checks into categories. Checks that can be repaired
//! automatically carry a [`Fix`], applied by [`DoctorReport::run_fixes`].

mod fix;
mod integration;
mod services;
mod versions;

use serde::Serialize;

pub use fix::Fix;
pub use integration::{
    CONNECTION_TIMEOUT, check_integration, check_mcp, config_check, connection_check,
    registration_check, tool_execution_check,
};
pub use services::{
    OBSERVABILITY, check_observability, check_services, emacs_check, http_service_check,
    observability_check,
};
pub use versions::{check_env_vars, check_versions, env_check, version_check};

use crate::config::HiveConfig;
use crate::detect::{Status, Summary};
use crate::error::{HiveError, StepError};

/// Outcome of one health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    /// One of `Ok`, `Warning` or `Error`.
    pub status: Status,
    pub message: String,
    pub details: Option<String>,
    /// Manual repair instructions.
    pub fix_hint: Option<String>,
    /// Automatic repair, when one exists.
    pub fix: Option<Fix>,
}

impl CheckResult {
    pub fn new(name: impl Into<String>, status: Status, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
            details: None,
            fix_hint: None,
            fix: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

/// A named group of checks.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub name: String,
    pub checks: Vec<CheckResult>,
}

impl Category {
    pub fn new(name: impl Into<String>, checks: Vec<CheckResult>) -> Self {
        Self {
            name: name.into(),
            checks,
        }
    }
}

/// Fixes attempted by [`DoctorReport::run_fixes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FixTally {
    pub fixed: usize,
    pub failed: usize,
}

/// All doctor categories, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub categories: Vec<Category>,
}

impl DoctorReport {
    fn checks(&self) -> impl Iterator<Item = &CheckResult> {
        self.categories.iter().flat_map(|cat| cat.checks.iter())
    }

    pub fn summary(&self) -> Summary {
        Summary::tally(self.checks().map(|check| check.status))
    }

    /// True when no check reported an error.
    pub fn is_healthy(&self) -> bool {
        self.summary().fail == 0
    }

    /// Failing checks that have an automatic fix.
    pub fn fixable(&self) -> Vec<&CheckResult> {
        self.checks()
            .filter(|check| !check.is_ok() && check.fix.is_some())
            .collect()
    }

    /// Applies every available fix, reporting each outcome to `on_fix`.
    ///
    /// A failed fix does not stop the remaining ones.
    pub fn run_fixes<F>(&self, config: &HiveConfig, mut on_fix: F) -> FixTally
    where
        F: FnMut(&CheckResult, Option<&StepError>),
    {
        let mut tally = FixTally::default();
        for check in self.fixable() {
            let Some(fix) = check.fix else { continue };
            match fix.apply(config) {
                Ok(()) => {
                    tally.fixed += 1;
                    on_fix(check, None);
                }
                Err(err) => {
                    tracing::warn!(check = %check.name, error = %err, "Fix failed");
                    tally.failed += 1;
                    on_fix(check, Some(&err));
                }
            }
        }
        tally
    }
}

/// Runs every health check against the live system.
///
/// ## Errors
///
/// Fails only if a built-in version pattern is invalid.
pub fn run(config: &HiveConfig) -> Result<DoctorReport, HiveError> {
    tracing::debug!("Running doctor checks");

    let env = |key: &str| std::env::var(key).ok();
    Ok(DoctorReport {
        categories: vec![
            Category::new("Version Requirements", check_versions()?),
            Category::new("Environment Variables", check_env_vars(env)),
            Category::new("Service Health", check_services(config)),
            Category::new("MCP Configuration", check_mcp(config)),
            Category::new("Integration Tests", check_integration(config)),
            Category::new("Observability (Optional)", check_observability()),
        ],
    })
}
