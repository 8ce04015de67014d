//! Idempotent environment setup.
//!
//! [`default_plan`] builds the ordered step list for a full hive-mcp install
//! and [`Runner`] executes it.

mod observer;
mod runner;
mod step;
pub mod steps;

use std::path::Path;

pub use observer::{RunObserver, SilentObserver, TracingObserver};
pub use runner::{Runner, run_steps};
pub use step::{CheckPolicy, Step, StepOutcome, StepResult};

use crate::config::HiveConfig;
use crate::depsfile::read_packages;
use crate::error::HiveError;
use crate::platform::Platform;
use steps::{
    ChromaStep, CloneStep, DepsStep, DoomSyncStep, EmacsDaemonStep, Installer, McpStep,
    OllamaStep, PrerequisitesStep, ShellStep,
};

/// Builds the full setup plan for the current user.
///
/// ## Errors
///
/// Fails if the home directory is unknown or the extra packages file cannot
/// be read.
pub fn default_plan(
    config: &HiveConfig,
    platform: &Platform,
) -> Result<Vec<Box<dyn Step>>, HiveError> {
    let home = dirs::home_dir().ok_or(HiveError::NoHomeDir)?;
    plan_for_home(config, platform, &home)
}

/// Builds the setup plan with an explicit home directory.
pub fn plan_for_home(
    config: &HiveConfig,
    platform: &Platform,
    home: &Path,
) -> Result<Vec<Box<dyn Step>>, HiveError> {
    let dir = &config.hive_mcp_dir;

    let extra = match &config.extra_packages_file {
        Some(path) => read_packages(path)?,
        None => Vec::new(),
    };
    let prerequisites =
        PrerequisitesStep::new(Installer::for_platform(platform)).with_extra_packages(extra);

    Ok(vec![
        Box::new(CloneStep::new(dir, &config.repo_url)),
        Box::new(ShellStep::new(home, dir)),
        Box::new(prerequisites),
        Box::new(DepsStep::new(dir)),
        Box::new(DoomSyncStep::new(home)),
        Box::new(ChromaStep::new(dir, &config.chroma_url)),
        Box::new(OllamaStep::new(&config.ollama_url, &config.embedding_model)),
        Box::new(EmacsDaemonStep::new()),
        Box::new(McpStep::new(dir, &config.mcp_server_name)),
    ])
}
