//! The idempotent step contract.
//!
//! A [`Step`] is the smallest unit of setup work. It exposes a side-effect
//! free probe ([`Step::check`]), the action itself ([`Step::run`]) and a
//! best-effort compensating action ([`Step::rollback`]).

use std::fmt;
use std::sync::Arc;

use crate::error::StepError;

/// How the runner decides whether a step still has work to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckPolicy {
    /// Call [`Step::check`] and skip [`Step::run`] when it reports done.
    #[default]
    Probe,
    /// Never probe; the action is cheap enough to repeat on every run.
    AlwaysRun,
}

/// A named, idempotent unit of setup work.
///
/// ## Contract
///
/// - `check` returns `Ok(true)` when the goal state already holds. An `Err`
///   means the probe itself could not complete, which aborts the run.
/// - `run` is only invoked after `check` returned `Ok(false)` (or for
///   [`CheckPolicy::AlwaysRun`] steps). Failures are reported as errors,
///   never panics.
/// - `rollback` must be safe to call even when `run` never ran or failed
///   halfway. Irreversible actions implement it as a no-op.
pub trait Step {
    /// Human-readable name used in progress output and results.
    fn name(&self) -> &str;

    /// Probe whether the step's goal state is already satisfied.
    fn check(&self) -> Result<bool, StepError>;

    /// Perform the action.
    fn run(&self) -> Result<(), StepError>;

    /// Undo the action, best effort.
    fn rollback(&self) -> Result<(), StepError>;

    fn check_policy(&self) -> CheckPolicy {
        CheckPolicy::Probe
    }
}

/// Outcome of attempting one step.
#[derive(Debug)]
pub enum StepOutcome {
    /// The probe reported the goal state already held.
    Skipped,
    /// The action ran and succeeded.
    Succeeded,
    /// The probe or the action failed.
    Failed(Arc<StepError>),
}

impl StepOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, StepOutcome::Skipped)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&StepError> {
        match self {
            StepOutcome::Failed(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Skipped => f.write_str("skipped"),
            StepOutcome::Succeeded => f.write_str("succeeded"),
            StepOutcome::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// Result of one step, produced by the runner and never mutated afterwards.
#[derive(Debug)]
pub struct StepResult {
    pub step_name: String,
    pub outcome: StepOutcome,
}

impl StepResult {
    pub(crate) fn new(step_name: impl Into<String>, outcome: StepOutcome) -> Self {
        Self {
            step_name: step_name.into(),
            outcome,
        }
    }
}
