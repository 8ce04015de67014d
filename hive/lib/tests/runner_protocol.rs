//! End-to-end checks of the step protocol using steps backed by marker files.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use hive_lib::setup::steps::CloneStep;
use hive_lib::setup::{Runner, SilentObserver, Step, StepOutcome};
use hive_lib::{RunnerError, StepError};

type Journal = Rc<RefCell<Vec<String>>>;

/// A step whose goal state is "marker file exists".
struct MarkerStep {
    name: String,
    marker: PathBuf,
    fail_with: Option<&'static str>,
    rollback_error: Option<&'static str>,
    journal: Journal,
}

impl MarkerStep {
    fn new(name: &str, dir: &Path, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            marker: dir.join(format!("{name}.done")),
            fail_with: None,
            rollback_error: None,
            journal: Rc::clone(journal),
        }
    }

    fn failing(mut self, message: &'static str) -> Self {
        self.fail_with = Some(message);
        self
    }

    fn rollback_fails(mut self, message: &'static str) -> Self {
        self.rollback_error = Some(message);
        self
    }

    fn record(&self, op: &str) {
        self.journal.borrow_mut().push(format!("{op} {}", self.name));
    }
}

impl Step for MarkerStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<bool, StepError> {
        self.record("check");
        Ok(self.marker.exists())
    }

    fn run(&self) -> Result<(), StepError> {
        self.record("run");
        if let Some(message) = self.fail_with {
            return Err(StepError::msg(message));
        }
        fs::write(&self.marker, b"ok")?;
        Ok(())
    }

    fn rollback(&self) -> Result<(), StepError> {
        self.record("rollback");
        if let Some(message) = self.rollback_error {
            return Err(StepError::msg(message));
        }
        if self.marker.exists() {
            fs::remove_file(&self.marker)?;
        }
        Ok(())
    }
}

fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

fn entries(journal: &Journal, op: &str) -> Vec<String> {
    journal
        .borrow()
        .iter()
        .filter(|entry| entry.starts_with(op))
        .cloned()
        .collect()
}

#[test]
fn test_skip_success_then_failure_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let journal = journal();
    fs::write(dir.path().join("A.done"), b"").unwrap();

    let steps: Vec<Box<dyn Step>> = vec![
        Box::new(MarkerStep::new("A", dir.path(), &journal)),
        Box::new(MarkerStep::new("B", dir.path(), &journal)),
        Box::new(MarkerStep::new("C", dir.path(), &journal).failing("disk full")),
    ];
    let mut runner = Runner::with_observer(&steps, Box::new(SilentObserver));

    let err = runner.run_all().unwrap_err();
    assert!(matches!(err, RunnerError::StepFailed { .. }));
    assert_eq!(err.step(), "C");
    assert!(err.to_string().contains("disk full"));

    let results = runner.results();
    assert_eq!(results.len(), 3);
    assert!(matches!(results[0].outcome, StepOutcome::Skipped));
    assert!(matches!(results[1].outcome, StepOutcome::Succeeded));
    assert_eq!(
        results[2].outcome.error().map(ToString::to_string).as_deref(),
        Some("disk full")
    );
    assert_eq!(runner.failed_index(), Some(2));
    assert_eq!(entries(&journal, "run"), vec!["run B", "run C"]);
}

#[test]
fn test_second_run_after_success_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let journal = journal();
    let steps: Vec<Box<dyn Step>> = vec![
        Box::new(MarkerStep::new("clone", dir.path(), &journal)),
        Box::new(MarkerStep::new("shell", dir.path(), &journal)),
        Box::new(MarkerStep::new("daemon", dir.path(), &journal)),
    ];

    Runner::with_observer(&steps, Box::new(SilentObserver))
        .run_all()
        .unwrap();
    assert_eq!(entries(&journal, "run").len(), 3);

    journal.borrow_mut().clear();
    let mut again = Runner::with_observer(&steps, Box::new(SilentObserver));
    again.run_all().unwrap();

    assert!(entries(&journal, "run").is_empty());
    assert!(again.results().iter().all(|r| r.outcome.is_skipped()));
}

#[test]
fn test_failure_leaves_later_steps_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let journal = journal();
    let steps: Vec<Box<dyn Step>> = vec![
        Box::new(MarkerStep::new("s0", dir.path(), &journal)),
        Box::new(MarkerStep::new("s1", dir.path(), &journal).failing("boom")),
        Box::new(MarkerStep::new("s2", dir.path(), &journal)),
        Box::new(MarkerStep::new("s3", dir.path(), &journal)),
    ];

    let mut runner = Runner::with_observer(&steps, Box::new(SilentObserver));
    assert!(runner.run_all().is_err());

    let names: Vec<&str> = runner
        .results()
        .iter()
        .map(|r| r.step_name.as_str())
        .collect();
    assert_eq!(names, vec!["s0", "s1"]);
    assert!(journal.borrow().iter().all(|e| !e.ends_with("s2") && !e.ends_with("s3")));
    assert!(!dir.path().join("s2.done").exists());
}

#[test]
fn test_rollback_reverses_and_reports_every_failure() {
    let dir = tempfile::tempdir().unwrap();
    let journal = journal();
    let steps: Vec<Box<dyn Step>> = vec![
        Box::new(MarkerStep::new("first", dir.path(), &journal)),
        Box::new(MarkerStep::new("middle", dir.path(), &journal).rollback_fails("busy")),
        Box::new(MarkerStep::new("last", dir.path(), &journal).failing("no network")),
    ];

    let mut runner = Runner::with_observer(&steps, Box::new(SilentObserver));
    runner.run_all().unwrap_err();
    let failed = runner.failed_index().unwrap();

    journal.borrow_mut().clear();
    let errors = runner.rollback_from(failed);

    assert_eq!(
        entries(&journal, "rollback"),
        vec!["rollback last", "rollback middle", "rollback first"]
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].step(), "middle");
    assert_eq!(errors[0].to_string(), "rollback middle: busy");
    assert!(!dir.path().join("first.done").exists());
}

#[test]
fn test_rollback_keeps_checkout_that_predates_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let journal = journal();
    let checkout = dir.path().join("hive-mcp");
    fs::create_dir_all(checkout.join(".git")).unwrap();
    fs::write(checkout.join("user-work.txt"), b"uncommitted").unwrap();

    let steps: Vec<Box<dyn Step>> = vec![
        Box::new(CloneStep::new(&checkout, "https://example.invalid/hive-mcp.git")),
        Box::new(MarkerStep::new("shell", dir.path(), &journal)),
        Box::new(MarkerStep::new("daemon", dir.path(), &journal).failing("no display")),
    ];
    let mut runner = Runner::with_observer(&steps, Box::new(SilentObserver));
    runner.run_all().unwrap_err();
    assert!(runner.results()[0].outcome.is_skipped());

    let errors = runner.rollback_attempted();

    assert!(errors.is_empty());
    assert_eq!(
        entries(&journal, "rollback"),
        vec!["rollback daemon", "rollback shell"]
    );
    assert!(checkout.join("user-work.txt").exists());
    assert!(!dir.path().join("shell.done").exists());
}
