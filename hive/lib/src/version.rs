//! Tool version extraction and comparison.

use std::cmp::Ordering;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::process::{capture, find_program};

/// A tool whose installed version is checked against a minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub command: &'static str,
    pub version_arg: &'static str,
    /// Pattern whose first capture group is the version. A second capture
    /// group, when it matches, is appended as a minor component.
    pub pattern: &'static str,
    pub min_version: &'static str,
    pub fix_hint: &'static str,
}

/// Tools required by the hive-mcp environment, in report order.
pub const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "Emacs",
        command: "emacs",
        version_arg: "--version",
        pattern: r"GNU Emacs (\d+\.\d+)",
        min_version: "28.1",
        fix_hint: "Install Emacs 28.1+ via package manager or build from source",
    },
    ToolSpec {
        name: "Java",
        command: "java",
        version_arg: "-version",
        pattern: r#"version "?(\d+)(?:\.(\d+))?"#,
        min_version: "17",
        fix_hint: "Install OpenJDK 17+: sudo apt install openjdk-17-jdk",
    },
    ToolSpec {
        name: "Clojure",
        command: "clojure",
        version_arg: "--version",
        pattern: r"Clojure CLI version (\d+\.\d+\.\d+)",
        min_version: "1.11.0",
        fix_hint: "Install Clojure: curl -L -O https://github.com/clojure/brew-install/releases/latest/download/posix-install.sh && chmod +x posix-install.sh && sudo ./posix-install.sh",
    },
    ToolSpec {
        name: "Babashka",
        command: "bb",
        version_arg: "--version",
        pattern: r"babashka v?(\d+\.\d+\.\d+)",
        min_version: "1.3.0",
        fix_hint: "Install Babashka: bash < <(curl -s https://raw.githubusercontent.com/babashka/babashka/master/install)",
    },
    ToolSpec {
        name: "Docker",
        command: "docker",
        version_arg: "--version",
        pattern: r"Docker version (\d+\.\d+\.\d+)",
        min_version: "20.0.0",
        fix_hint: "Install Docker: https://docs.docker.com/engine/install/",
    },
    ToolSpec {
        name: "Git",
        command: "git",
        version_arg: "--version",
        pattern: r"git version (\d+\.\d+\.\d+)",
        min_version: "2.0.0",
        fix_hint: "Install Git: sudo apt install git",
    },
    ToolSpec {
        name: "Claude CLI",
        command: "claude",
        version_arg: "--version",
        pattern: r"(\d+\.\d+\.\d+)",
        min_version: "0.1.0",
        fix_hint: "Install Claude CLI: npm install -g @anthropic-ai/claude-code",
    },
];

/// Result of probing one tool's version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "version", rename_all = "snake_case")]
pub enum VersionProbe {
    /// The command is not on PATH.
    Missing,
    /// The command ran but its output did not match the pattern.
    Unknown,
    /// Parsed version, with whether it meets the minimum.
    Found { version: String, meets_minimum: bool },
}

/// Parses a dotted version into its numeric components.
///
/// A leading `v` is ignored and only the leading digits of each component
/// count, so `v1.2.3-beta` parses as `[1, 2, 3]`.
pub fn parse_version(version: &str) -> Vec<u64> {
    version
        .trim()
        .trim_start_matches('v')
        .split('.')
        .filter_map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        })
        .collect()
}

/// Compares two versions component-wise, treating missing components as 0.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a = parse_version(a);
    let b = parse_version(b);
    let len = a.len().max(b.len());

    (0..len)
        .map(|i| {
            let left = a.get(i).copied().unwrap_or(0);
            let right = b.get(i).copied().unwrap_or(0);
            left.cmp(&right)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Extracts a version from tool output with `pattern`.
pub fn extract_version(output: &str, pattern: &Regex) -> Option<String> {
    let captures = pattern.captures(output)?;
    let major = captures.get(1)?.as_str();
    match captures.get(2) {
        Some(minor) if !minor.as_str().is_empty() => Some(format!("{major}.{}", minor.as_str())),
        _ => Some(major.to_string()),
    }
}

impl ToolSpec {
    /// Runs the tool's version command and compares against the minimum.
    ///
    /// ## Errors
    ///
    /// Fails only if the tool's pattern is not a valid regex.
    pub fn probe(&self) -> crate::Result<VersionProbe> {
        let pattern = Regex::new(self.pattern)?;

        let Some(path) = find_program(self.command) else {
            return Ok(VersionProbe::Missing);
        };
        let path = path.to_string_lossy();

        // Some tools (java) print their version on stderr.
        let output = match capture(&path, &[self.version_arg]) {
            Ok(output) => output.combined(),
            Err(err) => {
                tracing::debug!(tool = self.name, error = %err, "Version command failed");
                return Ok(VersionProbe::Unknown);
            }
        };

        Ok(self.classify(&output, &pattern))
    }

    fn classify(&self, output: &str, pattern: &Regex) -> VersionProbe {
        match extract_version(output, pattern) {
            Some(version) => {
                let meets_minimum = compare_versions(&version, self.min_version).is_ge();
                VersionProbe::Found {
                    version,
                    meets_minimum,
                }
            }
            None => VersionProbe::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(name: &str) -> ToolSpec {
        *TOOLS.iter().find(|t| t.name == name).unwrap()
    }

    #[test]
    fn test_parse_version_strips_prefix_and_suffix() {
        assert_eq!(parse_version("v1.2.3-beta"), vec![1, 2, 3]);
        assert_eq!(parse_version("29.1"), vec![29, 1]);
        assert_eq!(parse_version(""), Vec::<u64>::new());
    }

    #[test]
    fn test_compare_versions_pads_missing_components() {
        assert_eq!(compare_versions("17", "17.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.11.1", "1.11.0"), Ordering::Greater);
        assert_eq!(compare_versions("2.0", "2.0.1"), Ordering::Less);
        assert_eq!(compare_versions("10.0", "9.9.9"), Ordering::Greater);
    }

    #[test]
    fn test_extract_java_version_joins_minor() {
        let pattern = Regex::new(tool("Java").pattern).unwrap();
        let output = "openjdk version \"17.0.9\" 2023-10-17\nOpenJDK Runtime Environment";
        assert_eq!(extract_version(output, &pattern).as_deref(), Some("17.0"));
    }

    #[test]
    fn test_extract_java_legacy_version() {
        let pattern = Regex::new(tool("Java").pattern).unwrap();
        assert_eq!(
            extract_version("java version \"1.8.0_381\"", &pattern).as_deref(),
            Some("1.8")
        );
    }

    #[test]
    fn test_emacs_below_minimum() {
        let emacs = tool("Emacs");
        let pattern = Regex::new(emacs.pattern).unwrap();
        let probe = emacs.classify("GNU Emacs 27.2\nCopyright (C) 2021", &pattern);
        assert_eq!(
            probe,
            VersionProbe::Found {
                version: "27.2".to_string(),
                meets_minimum: false
            }
        );
    }

    #[test]
    fn test_babashka_meets_minimum() {
        let bb = tool("Babashka");
        let pattern = Regex::new(bb.pattern).unwrap();
        let probe = bb.classify("babashka v1.3.189", &pattern);
        assert_eq!(
            probe,
            VersionProbe::Found {
                version: "1.3.189".to_string(),
                meets_minimum: true
            }
        );
    }

    #[test]
    fn test_unparsable_output_is_unknown() {
        let docker = tool("Docker");
        let pattern = Regex::new(docker.pattern).unwrap();
        assert_eq!(docker.classify("podman 4.0", &pattern), VersionProbe::Unknown);
    }

    #[test]
    fn test_all_patterns_compile() {
        for tool in TOOLS {
            assert!(Regex::new(tool.pattern).is_ok(), "{} pattern", tool.name);
        }
    }

    #[test]
    fn test_missing_tool_probe() {
        let tool = ToolSpec {
            name: "Nope",
            command: "__nonexistent_program_xyz_12345__",
            version_arg: "--version",
            pattern: r"(\d+)",
            min_version: "1",
            fix_hint: "",
        };
        assert_eq!(tool.probe().unwrap(), VersionProbe::Missing);
    }
}
