//! Shell profile configuration.
//!
//! Exports are written inside a marker-delimited block so they can be found
//! again by `check` and removed cleanly by `rollback`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StepError;
use crate::setup::step::Step;

/// Marker identifying the block this tool manages in shell rc files.
pub const SHELL_MARKER: &str = "# hive-mcp-cli managed";

/// rc files considered, relative to the home directory.
const RC_FILES: [&str; 2] = [".bashrc", ".zshrc"];

/// Exports `HIVE_MCP_DIR` and `BB_MCP_DIR` from the user's shell rc files.
#[derive(Debug, Clone)]
pub struct ShellStep {
    home: PathBuf,
    hive_mcp_dir: PathBuf,
}

impl ShellStep {
    pub fn new(home: impl Into<PathBuf>, hive_mcp_dir: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            hive_mcp_dir: hive_mcp_dir.into(),
        }
    }

    /// rc files that exist under the home directory.
    pub fn rc_files(&self) -> Vec<PathBuf> {
        RC_FILES
            .iter()
            .map(|name| self.home.join(name))
            .filter(|path| path.is_file())
            .collect()
    }

    fn block(&self) -> String {
        let dir = self.hive_mcp_dir.display();
        format!(
            "\n{SHELL_MARKER} - START\nexport HIVE_MCP_DIR=\"{dir}\"\nexport BB_MCP_DIR=\"{dir}\"\n{SHELL_MARKER} - END\n"
        )
    }
}

impl Step for ShellStep {
    fn name(&self) -> &str {
        "Configure shell environment"
    }

    fn check(&self) -> Result<bool, StepError> {
        // An unreadable rc file just doesn't count as configured.
        Ok(self.rc_files().iter().any(|path| {
            fs::read_to_string(path)
                .map(|content| content.contains(SHELL_MARKER))
                .unwrap_or(false)
        }))
    }

    fn run(&self) -> Result<(), StepError> {
        let files = self.rc_files();
        if files.is_empty() {
            return Err(StepError::msg("no shell config found (.bashrc or .zshrc)"));
        }

        let block = self.block();
        for path in files {
            let mut file = OpenOptions::new().append(true).open(&path)?;
            file.write_all(block.as_bytes())?;
            tracing::debug!(file = %path.display(), "Appended managed block");
        }
        Ok(())
    }

    fn rollback(&self) -> Result<(), StepError> {
        for path in self.rc_files() {
            remove_managed_block(&path)?;
        }
        Ok(())
    }
}

/// Removes the managed block from `content`, plus the trailing blank lines
/// left behind. Returns `None` when no block is present.
pub fn strip_managed_block(content: &str) -> Option<String> {
    let start = format!("{SHELL_MARKER} - START");
    let end = format!("{SHELL_MARKER} - END");
    if !content.contains(&start) {
        return None;
    }

    let mut in_block = false;
    let mut kept: Vec<&str> = Vec::new();
    for line in content.lines() {
        if line.contains(&start) {
            in_block = true;
        } else if line.contains(&end) {
            in_block = false;
        } else if !in_block {
            kept.push(line);
        }
    }

    while kept.last().is_some_and(|line| line.is_empty()) {
        kept.pop();
    }

    let mut out = kept.join("\n");
    out.push('\n');
    Some(out)
}

fn remove_managed_block(path: &Path) -> Result<(), StepError> {
    let content = fs::read_to_string(path)?;
    if let Some(stripped) = strip_managed_block(&content) {
        fs::write(path, stripped)?;
        tracing::debug!(file = %path.display(), "Removed managed block");
    }
    Ok(())
}
