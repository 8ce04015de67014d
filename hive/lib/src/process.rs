//! External command execution.
//!
//! Every step shells out to pre-existing tools. Installs stream their output
//! to the user's terminal, probes run with captured or discarded output.

use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use which::which;

use crate::error::StepError;

/// Interval between exit polls while waiting on a bounded command.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Finds a program by name in the system PATH.
///
/// ## Examples
///
/// ```
/// use hive_lib::process::find_program;
///
/// if let Some(path) = find_program("git") {
///     println!("git found at: {}", path.display());
/// }
/// ```
pub fn find_program<P: AsRef<OsStr>>(program: P) -> Option<PathBuf> {
    which(program).ok()
}

/// Returns true if every program is on PATH.
pub fn all_programs_present(programs: &[&str]) -> bool {
    programs.iter().all(|program| find_program(program).is_some())
}

/// Resolves a required tool, failing with an install hint when absent.
pub fn require_program(program: &str, hint: &str) -> Result<PathBuf, StepError> {
    find_program(program).ok_or_else(|| StepError::MissingTool {
        tool: program.to_string(),
        hint: hint.to_string(),
    })
}

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the process exited with status 0.
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// stdout followed by stderr, for tools that print versions to either.
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

fn build(program: &str, args: &[&str], dir: Option<&Path>) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    cmd
}

fn spawn_error(program: &str, source: std::io::Error) -> StepError {
    StepError::Spawn {
        program: program.to_string(),
        source,
    }
}

/// Runs a command with stdout/stderr attached to the terminal.
///
/// ## Errors
///
/// Fails if the program cannot be started or exits unsuccessfully.
pub fn run_inherited(program: &str, args: &[&str], dir: Option<&Path>) -> Result<(), StepError> {
    let line = command_line(program, args);
    tracing::debug!(command = %line, dir = ?dir, "Running command");

    let status = build(program, args, dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| spawn_error(program, e))?;

    if status.success() {
        Ok(())
    } else {
        Err(StepError::CommandFailed {
            command: line,
            status: status.to_string(),
            stderr: String::new(),
        })
    }
}

/// Runs a command with all output discarded; only the exit status matters.
pub fn run_quiet(program: &str, args: &[&str], dir: Option<&Path>) -> Result<(), StepError> {
    let line = command_line(program, args);
    tracing::debug!(command = %line, "Running quiet command");

    let status = build(program, args, dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| spawn_error(program, e))?;

    if status.success() {
        Ok(())
    } else {
        Err(StepError::CommandFailed {
            command: line,
            status: status.to_string(),
            stderr: String::new(),
        })
    }
}

/// Runs a command and captures its output regardless of exit status.
///
/// ## Errors
///
/// Fails only when the program cannot be started.
pub fn capture(program: &str, args: &[&str]) -> Result<CommandOutput, StepError> {
    tracing::debug!(command = %command_line(program, args), "Capturing command output");

    let output = build(program, args, None)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error(program, e))?;

    Ok(CommandOutput::from_output(output))
}

/// Starts a long-running program in the background without waiting.
pub fn spawn_detached(program: &str, args: &[&str]) -> Result<(), StepError> {
    tracing::debug!(command = %command_line(program, args), "Spawning detached command");

    build(program, args, None)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|e| spawn_error(program, e))
}

/// Runs a command, killing it if it has not exited after `timeout`.
///
/// ## Errors
///
/// Returns [`StepError::Timeout`] when the deadline passes, or a spawn error
/// when the program cannot be started.
pub fn capture_with_timeout(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<CommandOutput, StepError> {
    let line = command_line(program, args);
    tracing::debug!(command = %line, timeout_secs = timeout.as_secs(), "Running bounded command");

    let mut child = build(program, args, None)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(program, e))?;

    // Pipes are drained while the child runs so a chatty command cannot
    // fill the pipe buffer and block before exiting.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(CommandOutput {
                success: status.success(),
                stdout: collect(stdout),
                stderr: collect(stderr),
            });
        }

        if Instant::now() >= deadline {
            if let Err(err) = child.kill() {
                tracing::warn!(command = %line, error = %err, "Failed to kill timed out command");
            }
            let _ = child.wait();
            return Err(StepError::Timeout {
                what: line,
                after: timeout,
            });
        }

        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            if let Err(err) = pipe.read_to_end(&mut buf) {
                tracing::debug!(error = %err, "Stopped reading command output");
            }
            buf
        })
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .map(|buf| String::from_utf8_lossy(&buf).into_owned())
        .unwrap_or_default()
}
