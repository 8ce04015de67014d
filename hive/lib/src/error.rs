use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Error raised by a single step's `check`, `run` or `rollback`.
///
/// The runner never inspects the variant; any error from `check` or `run`
/// is fatal to the current run and is relayed to the caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// IO error occurred during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An external program could not be started at all.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external program ran but exited unsuccessfully.
    #[error("`{command}` failed ({status}){}", stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// A required tool is not on PATH.
    #[error("{tool} not found - {hint}")]
    MissingTool { tool: String, hint: String },

    /// HTTP probe or request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A bounded wait expired.
    #[error("{what} did not complete within {}s", .after.as_secs())]
    Timeout { what: String, after: Duration },

    /// Any other failure with a human-readable explanation.
    #[error("{0}")]
    Message(String),
}

impl StepError {
    /// Shorthand for [`StepError::Message`].
    pub fn msg(message: impl Into<String>) -> Self {
        StepError::Message(message.into())
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Error surfaced by the [`Runner`](crate::setup::Runner).
///
/// Every variant names the step it came from and keeps the step's original
/// error as its source. The error is shared with the matching
/// [`StepResult`](crate::setup::StepResult).
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The step's probe could not determine its state.
    #[error("check failed for {step}: {source}")]
    CheckFailed {
        step: String,
        #[source]
        source: Arc<StepError>,
    },

    /// The step's action failed.
    #[error("step {step} failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: Arc<StepError>,
    },

    /// A compensating action failed during rollback.
    #[error("rollback {step}: {source}")]
    RollbackFailed {
        step: String,
        #[source]
        source: Arc<StepError>,
    },
}

impl RunnerError {
    /// Name of the step this error belongs to.
    pub fn step(&self) -> &str {
        match self {
            RunnerError::CheckFailed { step, .. }
            | RunnerError::StepFailed { step, .. }
            | RunnerError::RollbackFailed { step, .. } => step,
        }
    }

    /// The step's original error.
    pub fn step_error(&self) -> &StepError {
        match self {
            RunnerError::CheckFailed { source, .. }
            | RunnerError::StepFailed { source, .. }
            | RunnerError::RollbackFailed { source, .. } => source.as_ref(),
        }
    }
}

/// Errors from configuration loading and report gathering.
#[derive(Debug, thiserror::Error)]
pub enum HiveError {
    /// IO error occurred during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file could not be parsed.
    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The home directory could not be determined.
    #[error("cannot determine home directory")]
    NoHomeDir,

    /// A version pattern failed to compile.
    #[error("invalid version pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Convenience Result type for hive operations.
pub type Result<T> = std::result::Result<T, HiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_includes_trimmed_stderr() {
        let err = StepError::CommandFailed {
            command: "git clone x".to_string(),
            status: "exit status: 128".to_string(),
            stderr: "fatal: repository not found\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "`git clone x` failed (exit status: 128): fatal: repository not found"
        );
    }

    #[test]
    fn test_command_failed_without_stderr() {
        let err = StepError::CommandFailed {
            command: "docker info".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "  ".to_string(),
        };
        assert_eq!(err.to_string(), "`docker info` failed (exit status: 1)");
    }

    #[test]
    fn test_runner_error_names_step() {
        let err = RunnerError::StepFailed {
            step: "C".to_string(),
            source: Arc::new(StepError::msg("disk full")),
        };
        assert_eq!(err.step(), "C");
        assert_eq!(err.to_string(), "step C failed: disk full");
        assert_eq!(err.step_error().to_string(), "disk full");
    }

    #[test]
    fn test_timeout_message() {
        let err = StepError::Timeout {
            what: "Chroma".to_string(),
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "Chroma did not complete within 30s");
    }
}
