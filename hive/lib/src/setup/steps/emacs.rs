use std::thread;
use std::time::Duration;

use crate::error::StepError;
use crate::process::{capture, run_inherited, run_quiet};
use crate::setup::step::Step;

const STARTUP_GRACE: Duration = Duration::from_secs(2);

/// Returns the PID of a running Emacs daemon, if one answers.
pub fn daemon_pid() -> Option<String> {
    let output = capture("emacsclient", &["-e", "(emacs-pid)"]).ok()?;
    let pid = output.stdout.trim();
    (output.success && !pid.is_empty()).then(|| pid.to_string())
}

/// Starts an Emacs daemon for the MCP server to talk to.
#[derive(Debug, Clone, Default)]
pub struct EmacsDaemonStep;

impl EmacsDaemonStep {
    pub fn new() -> Self {
        Self
    }
}

impl Step for EmacsDaemonStep {
    fn name(&self) -> &str {
        "Start Emacs daemon"
    }

    fn check(&self) -> Result<bool, StepError> {
        Ok(run_quiet("emacsclient", &["-e", "(emacs-pid)"], None).is_ok())
    }

    fn run(&self) -> Result<(), StepError> {
        run_inherited("emacs", &["--daemon"], None)?;
        thread::sleep(STARTUP_GRACE);

        if self.check()? {
            Ok(())
        } else {
            Err(StepError::msg("Emacs daemon started but not responding"))
        }
    }

    fn rollback(&self) -> Result<(), StepError> {
        if let Err(err) = run_quiet("emacsclient", &["-e", "(kill-emacs)"], None) {
            tracing::debug!(error = %err, "Emacs daemon was not running");
        }
        Ok(())
    }
}
