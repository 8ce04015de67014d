use std::path::{Path, PathBuf};

use crate::error::StepError;
use crate::process::{capture, require_program, run_inherited, run_quiet};
use crate::setup::step::Step;

/// Babashka entry point of the hive-mcp server.
pub const SERVER_MAIN: &str = "bb.hive-mcp.server/-main";

/// Returns true if `claude mcp list` output has an entry named `name`.
///
/// Entries look like `emacs: bb --prn ... - ✓ Connected`.
pub fn lists_server(output: &str, name: &str) -> bool {
    output.lines().any(|line| {
        line.trim_start()
            .split_once(':')
            .is_some_and(|(entry, _)| entry.trim() == name)
    })
}

/// Arguments to `claude` that register the server.
pub fn add_args(name: &str, dir: &Path) -> Vec<String> {
    let classpath = dir.join("bb.edn");
    vec![
        "mcp".to_string(),
        "add".to_string(),
        name.to_string(),
        "--".to_string(),
        "bb".to_string(),
        "--prn".to_string(),
        "-cp".to_string(),
        classpath.to_string_lossy().into_owned(),
        "-m".to_string(),
        SERVER_MAIN.to_string(),
    ]
}

/// Registers the hive-mcp server with the `claude` CLI.
#[derive(Debug, Clone)]
pub struct McpStep {
    dir: PathBuf,
    server_name: String,
}

impl McpStep {
    pub fn new(dir: impl Into<PathBuf>, server_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            server_name: server_name.into(),
        }
    }
}

impl Step for McpStep {
    fn name(&self) -> &str {
        "Register MCP server with Claude CLI"
    }

    fn check(&self) -> Result<bool, StepError> {
        // A missing or unconfigured claude CLI means not registered yet.
        match capture("claude", &["mcp", "list"]) {
            Ok(output) if output.success => Ok(lists_server(&output.stdout, &self.server_name)),
            Ok(_) => Ok(false),
            Err(err) => {
                tracing::debug!(error = %err, "claude mcp list failed");
                Ok(false)
            }
        }
    }

    fn run(&self) -> Result<(), StepError> {
        require_program(
            "claude",
            "please install from https://github.com/anthropics/claude-code",
        )?;
        let args = add_args(&self.server_name, &self.dir);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_inherited("claude", &args, None)
    }

    fn rollback(&self) -> Result<(), StepError> {
        run_quiet("claude", &["mcp", "remove", &self.server_name], None)
    }
}
