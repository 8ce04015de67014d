use std::path::{Path, PathBuf};

use crate::error::StepError;
use crate::process::run_inherited;
use crate::setup::step::{CheckPolicy, Step};

/// Locations of the `doom` script relative to the home directory.
const DOOM_CANDIDATES: [&str; 2] = [".emacs.d/bin/doom", ".config/emacs/bin/doom"];

/// Returns the first `doom` script found under `home`.
pub fn find_doom(home: &Path) -> Option<PathBuf> {
    DOOM_CANDIDATES
        .iter()
        .map(|rel| home.join(rel))
        .find(|path| path.is_file())
}

/// Runs `doom sync` so Doom Emacs picks up the hive-mcp package config.
#[derive(Debug, Clone)]
pub struct DoomSyncStep {
    home: PathBuf,
}

impl DoomSyncStep {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }
}

impl Step for DoomSyncStep {
    fn name(&self) -> &str {
        "Sync Doom Emacs packages"
    }

    fn check(&self) -> Result<bool, StepError> {
        Ok(false)
    }

    fn run(&self) -> Result<(), StepError> {
        let doom = find_doom(&self.home)
            .ok_or_else(|| StepError::msg("doom command not found - is Doom Emacs installed?"))?;
        run_inherited(&doom.to_string_lossy(), &["sync"], None)
    }

    fn rollback(&self) -> Result<(), StepError> {
        Ok(())
    }

    fn check_policy(&self) -> CheckPolicy {
        CheckPolicy::AlwaysRun
    }
}
