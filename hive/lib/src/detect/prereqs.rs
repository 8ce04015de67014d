use serde::Serialize;

use super::Status;
use crate::error::HiveError;
use crate::version::{TOOLS, ToolSpec, VersionProbe};

/// Installed version of a required tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrereqCheck {
    pub status: Status,
    pub name: String,
    /// `None` when the tool is missing, `"unknown"` when unparsable.
    pub version: Option<String>,
    /// Minimum version.
    pub required: String,
    pub fix_hint: String,
}

impl PrereqCheck {
    pub(crate) fn from_probe(tool: &ToolSpec, probe: VersionProbe) -> Self {
        let (status, version) = match probe {
            VersionProbe::Missing => (Status::Missing, None),
            VersionProbe::Unknown => (Status::Warning, Some("unknown".to_string())),
            VersionProbe::Found {
                version,
                meets_minimum: true,
            } => (Status::Ok, Some(version)),
            VersionProbe::Found {
                version,
                meets_minimum: false,
            } => (Status::Warning, Some(version)),
        };

        Self {
            status,
            name: tool.name.to_string(),
            version,
            required: tool.min_version.to_string(),
            fix_hint: tool.fix_hint.to_string(),
        }
    }
}

/// Probes every required tool.
pub fn check_prereqs() -> Result<Vec<PrereqCheck>, HiveError> {
    TOOLS
        .iter()
        .map(|tool| Ok(PrereqCheck::from_probe(tool, tool.probe()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn git() -> &'static ToolSpec {
        TOOLS.iter().find(|t| t.name == "Git").unwrap()
    }

    #[test]
    fn test_missing_tool() {
        let check = PrereqCheck::from_probe(git(), VersionProbe::Missing);
        assert_eq!(check.status, Status::Missing);
        assert_eq!(check.version, None);
        assert_eq!(check.required, "2.0.0");
    }

    #[test]
    fn test_unparsable_version_is_warning() {
        let check = PrereqCheck::from_probe(git(), VersionProbe::Unknown);
        assert_eq!(check.status, Status::Warning);
        assert_eq!(check.version.as_deref(), Some("unknown"));
    }

    #[test]
    fn test_old_version_is_warning() {
        let check = PrereqCheck::from_probe(
            git(),
            VersionProbe::Found {
                version: "1.9.5".to_string(),
                meets_minimum: false,
            },
        );
        assert_eq!(check.status, Status::Warning);
        assert_eq!(check.version.as_deref(), Some("1.9.5"));
    }

    #[test]
    fn test_check_prereqs_covers_every_tool() {
        let checks = check_prereqs().unwrap();
        let names: Vec<&str> = checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Emacs", "Java", "Clojure", "Babashka", "Docker", "Git", "Claude CLI"]
        );
    }
}
