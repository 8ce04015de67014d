//! Progress observers passed to the [`Runner`](super::Runner).
//!
//! Observers are purely for reporting; they never influence control flow.

use crate::error::StepError;
use crate::setup::step::Step;

/// Receives progress notifications from the runner.
///
/// Both callbacks run synchronously on the runner's thread.
pub trait RunObserver {
    /// Called before a step is probed.
    fn on_start(&mut self, _step: &dyn Step) {}

    /// Called once a step has been skipped, succeeded or failed.
    fn on_done(&mut self, _step: &dyn Step, _skipped: bool, _error: Option<&StepError>) {}
}

/// Observer that reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl RunObserver for SilentObserver {}

/// Observer that emits `tracing` events for every transition.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_start(&mut self, step: &dyn Step) {
        tracing::info!(step = step.name(), "Starting step");
    }

    fn on_done(&mut self, step: &dyn Step, skipped: bool, error: Option<&StepError>) {
        match error {
            Some(err) => tracing::warn!(step = step.name(), error = %err, "Step failed"),
            None if skipped => tracing::info!(step = step.name(), "Step already done"),
            None => tracing::info!(step = step.name(), "Step completed"),
        }
    }
}
