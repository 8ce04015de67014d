use std::fs;
use std::path::PathBuf;

use crate::error::StepError;
use crate::process::{require_program, run_inherited};
use crate::setup::step::{CheckPolicy, Step};

/// Clones the hive-mcp repository, with submodules.
#[derive(Debug, Clone)]
pub struct CloneStep {
    dir: PathBuf,
    repo_url: String,
}

impl CloneStep {
    pub fn new(dir: impl Into<PathBuf>, repo_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            repo_url: repo_url.into(),
        }
    }
}

impl Step for CloneStep {
    fn name(&self) -> &str {
        "Clone hive-mcp repository"
    }

    fn check(&self) -> Result<bool, StepError> {
        Ok(self.dir.join(".git").exists())
    }

    fn run(&self) -> Result<(), StepError> {
        require_program("git", "install git first")?;

        if let Some(parent) = self.dir.parent() {
            fs::create_dir_all(parent)?;
        }

        let dir = self.dir.to_string_lossy();
        run_inherited("git", &["clone", "--recursive", &self.repo_url, &dir], None)
    }

    fn rollback(&self) -> Result<(), StepError> {
        if self.dir.exists() {
            tracing::debug!(dir = %self.dir.display(), "Removing cloned repository");
            fs::remove_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

/// Downloads the Clojure dependencies of the checkout with `clojure -P`.
///
/// There is no reliable probe for a complete dependency cache, so this step
/// runs every time.
#[derive(Debug, Clone)]
pub struct DepsStep {
    dir: PathBuf,
}

impl DepsStep {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Step for DepsStep {
    fn name(&self) -> &str {
        "Download Clojure dependencies"
    }

    fn check(&self) -> Result<bool, StepError> {
        Ok(false)
    }

    fn run(&self) -> Result<(), StepError> {
        run_inherited("clojure", &["-P"], Some(&self.dir))
    }

    fn rollback(&self) -> Result<(), StepError> {
        Ok(())
    }

    fn check_policy(&self) -> CheckPolicy {
        CheckPolicy::AlwaysRun
    }
}
