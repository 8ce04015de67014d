use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::error::StepError;
use crate::probe::{is_healthy, join_url};
use crate::process::{require_program, run_inherited, run_quiet};
use crate::setup::step::Step;

/// Chroma's liveness endpoint.
pub const HEARTBEAT_PATH: &str = "/api/v2/heartbeat";

const READY_ATTEMPTS: u32 = 15;
const READY_INTERVAL: Duration = Duration::from_secs(2);

/// Starts the Chroma vector database from the checkout's compose file.
#[derive(Debug, Clone)]
pub struct ChromaStep {
    dir: PathBuf,
    heartbeat_url: String,
    attempts: u32,
    interval: Duration,
}

impl ChromaStep {
    pub fn new(dir: impl Into<PathBuf>, chroma_url: &str) -> Self {
        Self {
            dir: dir.into(),
            heartbeat_url: join_url(chroma_url, HEARTBEAT_PATH),
            attempts: READY_ATTEMPTS,
            interval: READY_INTERVAL,
        }
    }

    /// Overrides how long `run` waits for the heartbeat.
    pub fn with_readiness(mut self, attempts: u32, interval: Duration) -> Self {
        self.attempts = attempts;
        self.interval = interval;
        self
    }

    pub fn heartbeat_url(&self) -> &str {
        &self.heartbeat_url
    }

    fn wait_until_ready(&self) -> Result<(), StepError> {
        for attempt in 1..=self.attempts {
            if is_healthy(&self.heartbeat_url) {
                tracing::debug!(attempt, "Chroma heartbeat ok");
                return Ok(());
            }
            thread::sleep(self.interval);
        }
        Err(StepError::Timeout {
            what: "Chroma startup".to_string(),
            after: self.interval * self.attempts,
        })
    }
}

impl Step for ChromaStep {
    fn name(&self) -> &str {
        "Start Docker services (Chroma)"
    }

    fn check(&self) -> Result<bool, StepError> {
        Ok(is_healthy(&self.heartbeat_url))
    }

    fn run(&self) -> Result<(), StepError> {
        require_program("docker", "install Docker: https://docs.docker.com/engine/install/")?;
        run_quiet("docker", &["info"], None)
            .map_err(|err| StepError::msg(format!("docker is not running: {err}")))?;

        run_inherited("docker", &["compose", "up", "-d", "chroma"], Some(&self.dir))?;
        self.wait_until_ready()
    }

    fn rollback(&self) -> Result<(), StepError> {
        run_quiet("docker", &["compose", "down"], Some(&self.dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn dead_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}")
    }

    #[test]
    fn test_heartbeat_url_is_joined() {
        let step = ChromaStep::new("/tmp/hive", "http://localhost:8000/");
        assert_eq!(step.heartbeat_url(), "http://localhost:8000/api/v2/heartbeat");
    }

    #[test]
    fn test_check_is_false_when_nothing_listens() {
        let step = ChromaStep::new("/tmp/hive", &dead_url());
        assert!(!step.check().unwrap());
    }

    #[test]
    fn test_wait_until_ready_times_out() {
        let step = ChromaStep::new("/tmp/hive", &dead_url())
            .with_readiness(2, Duration::from_millis(10));
        let err = step.wait_until_ready().unwrap_err();
        assert!(matches!(err, StepError::Timeout { .. }));
    }
}
