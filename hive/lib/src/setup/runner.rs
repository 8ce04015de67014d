//! Sequential step execution with idempotency and ordered rollback.
//!
//! ## Examples
//!
//! ```
//! use hive_lib::setup::{Runner, SilentObserver, Step};
//! use hive_lib::StepError;
//!
//! struct Noop;
//!
//! impl Step for Noop {
//!     fn name(&self) -> &str { "noop" }
//!     fn check(&self) -> Result<bool, StepError> { Ok(true) }
//!     fn run(&self) -> Result<(), StepError> { Ok(()) }
//!     fn rollback(&self) -> Result<(), StepError> { Ok(()) }
//! }
//!
//! let steps: Vec<Box<dyn Step>> = vec![Box::new(Noop)];
//! let mut runner = Runner::with_observer(&steps, Box::new(SilentObserver));
//! runner.run_all().unwrap();
//! assert!(runner.results()[0].outcome.is_skipped());
//! ```

use std::sync::Arc;

use crate::error::{RunnerError, StepError};
use crate::setup::observer::{RunObserver, TracingObserver};
use crate::setup::step::{CheckPolicy, Step, StepOutcome, StepResult};

/// Executes an ordered list of steps, stopping at the first failure.
///
/// The runner borrows the caller's steps and lives for a single setup
/// invocation. Its results are always a prefix of the step list.
pub struct Runner<'a> {
    steps: &'a [Box<dyn Step>],
    results: Vec<StepResult>,
    observer: Box<dyn RunObserver + 'a>,
}

impl<'a> Runner<'a> {
    /// Creates a runner that reports progress through `tracing`.
    pub fn new(steps: &'a [Box<dyn Step>]) -> Self {
        Self::with_observer(steps, Box::new(TracingObserver))
    }

    /// Creates a runner with an explicit progress observer.
    pub fn with_observer(steps: &'a [Box<dyn Step>], observer: Box<dyn RunObserver + 'a>) -> Self {
        Self {
            steps,
            results: Vec::with_capacity(steps.len()),
            observer,
        }
    }

    pub fn steps(&self) -> &[Box<dyn Step>] {
        self.steps
    }

    pub fn results(&self) -> &[StepResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<StepResult> {
        self.results
    }

    /// Index of the step that failed, if the last run stopped early.
    pub fn failed_index(&self) -> Option<usize> {
        self.results
            .last()
            .filter(|result| result.outcome.is_failed())
            .map(|_| self.results.len() - 1)
    }

    /// Executes every step in order.
    ///
    /// Steps whose probe reports done are skipped. A probe error or an
    /// action error aborts the run immediately; later steps are never
    /// touched.
    ///
    /// ## Errors
    ///
    /// Returns [`RunnerError::CheckFailed`] or [`RunnerError::StepFailed`]
    /// naming the first failing step and carrying its original error.
    pub fn run_all(&mut self) -> Result<(), RunnerError> {
        self.results.clear();
        let steps = self.steps;

        for step in steps {
            let step = step.as_ref();
            self.observer.on_start(step);

            let done = match step.check_policy() {
                CheckPolicy::AlwaysRun => false,
                CheckPolicy::Probe => match step.check() {
                    Ok(done) => done,
                    Err(err) => {
                        let err = self.fail(step, err);
                        return Err(RunnerError::CheckFailed {
                            step: step.name().to_string(),
                            source: err,
                        });
                    }
                },
            };

            if done {
                self.results
                    .push(StepResult::new(step.name(), StepOutcome::Skipped));
                self.observer.on_done(step, true, None);
                continue;
            }

            if let Err(err) = step.run() {
                let err = self.fail(step, err);
                return Err(RunnerError::StepFailed {
                    step: step.name().to_string(),
                    source: err,
                });
            }

            self.results
                .push(StepResult::new(step.name(), StepOutcome::Succeeded));
            self.observer.on_done(step, false, None);
        }

        Ok(())
    }

    /// Rolls back from `index` down to the first step, in reverse order.
    ///
    /// Every rollback is attempted even when an earlier one fails. Indices
    /// past the end of the step list are ignored.
    pub fn rollback_from(&self, index: usize) -> Vec<RunnerError> {
        let Some(last) = self.steps.len().checked_sub(1) else {
            return Vec::new();
        };

        (0..=index.min(last))
            .rev()
            .filter_map(|i| self.rollback_step(i))
            .collect()
    }

    /// Rolls back, newest first, only the steps the last run actually ran.
    ///
    /// Skipped steps found their goal state already in place before this
    /// run, so that state belongs to the user and is left alone. The failed
    /// step is included since its action may have partially applied.
    pub fn rollback_attempted(&self) -> Vec<RunnerError> {
        self.results
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, result)| !result.outcome.is_skipped())
            .filter_map(|(i, _)| self.rollback_step(i))
            .collect()
    }

    fn rollback_step(&self, index: usize) -> Option<RunnerError> {
        let step = &self.steps[index];
        step.rollback()
            .err()
            .map(|source| RunnerError::RollbackFailed {
                step: step.name().to_string(),
                source: Arc::new(source),
            })
    }

    fn fail(&mut self, step: &dyn Step, err: StepError) -> Arc<StepError> {
        let err = Arc::new(err);
        self.results.push(StepResult::new(
            step.name(),
            StepOutcome::Failed(Arc::clone(&err)),
        ));
        self.observer.on_done(step, false, Some(err.as_ref()));
        err
    }
}

/// Runs `steps` with the default tracing observer.
pub fn run_steps(steps: &[Box<dyn Step>]) -> Result<(), RunnerError> {
    Runner::new(steps).run_all()
}
