use std::fmt;

use serde::Serialize;

use crate::config::HiveConfig;
use crate::error::StepError;
use crate::process::{capture, run_quiet, spawn_detached};
use crate::setup::Step;
use crate::setup::steps::McpStep;

/// Automatic repair for a failing check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fix {
    StartEmacsDaemon,
    StartChroma,
    StartOllama,
    RegisterMcp,
}

impl Fix {
    /// Performs the repair.
    pub fn apply(self, config: &HiveConfig) -> Result<(), StepError> {
        tracing::debug!(fix = %self, "Applying fix");
        match self {
            Fix::StartEmacsDaemon => run_quiet("emacs", &["--daemon"], None),
            Fix::StartChroma => start_chroma_container(),
            Fix::StartOllama => spawn_detached("ollama", &["serve"]),
            Fix::RegisterMcp => {
                McpStep::new(&config.hive_mcp_dir, &config.mcp_server_name).run()
            }
        }
    }
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Fix::StartEmacsDaemon => "start Emacs daemon",
            Fix::StartChroma => "start Chroma container",
            Fix::StartOllama => "start Ollama",
            Fix::RegisterMcp => "register MCP server",
        };
        f.write_str(label)
    }
}

/// Restarts a stopped `chroma` container, or creates one.
fn start_chroma_container() -> Result<(), StepError> {
    let existing = capture(
        "docker",
        &["ps", "-a", "--filter", "name=chroma", "--format", "{{.Names}}"],
    )?;
    if existing.success && existing.stdout.lines().any(|name| name.trim() == "chroma") {
        match run_quiet("docker", &["start", "chroma"], None) {
            Ok(()) => return Ok(()),
            Err(err) => tracing::debug!(error = %err, "docker start failed, recreating"),
        }
    }

    run_quiet(
        "docker",
        &[
            "run",
            "-d",
            "--name",
            "chroma",
            "-p",
            "8000:8000",
            "-v",
            "chroma-data:/chroma/chroma",
            "chromadb/chroma",
        ],
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_labels() {
        assert_eq!(Fix::StartChroma.to_string(), "start Chroma container");
        assert_eq!(Fix::RegisterMcp.to_string(), "register MCP server");
    }
}
