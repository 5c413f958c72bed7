//! Job lifecycle listeners and best-effort fan-out.
//!
//! Listeners observe two transitions: submission (a handle exists) and
//! completion (a final result or failure). Fan-out is isolated per listener:
//! one hook's failure is logged and never prevents the remaining listeners
//! from being notified.

use std::sync::Arc;

use rill_core::{Error, Result};

use crate::executor::{JobExecutionResult, JobHandle};

/// Outcome delivered to [`JobListener::on_completed`].
pub type CompletionOutcome<'a> = std::result::Result<&'a JobExecutionResult, &'a Error>;

/// Observer of job lifecycle transitions.
pub trait JobListener: Send + Sync {
    /// Called once per submission, after a handle was obtained.
    ///
    /// # Errors
    ///
    /// A returned error is contained by the fan-out and does not affect other
    /// listeners or the submission itself.
    fn on_submitted(&self, handle: &dyn JobHandle) -> Result<()>;

    /// Called exactly once per submission with the final result or failure.
    ///
    /// # Errors
    ///
    /// A returned error is contained by the fan-out and does not affect other
    /// listeners or the outcome delivered to the caller.
    fn on_completed(&self, outcome: CompletionOutcome<'_>) -> Result<()>;
}

/// Notify every listener of a submission, in registration order.
pub(crate) fn notify_submitted(listeners: &[Arc<dyn JobListener>], handle: &dyn JobHandle) {
    for (index, listener) in listeners.iter().enumerate() {
        if let Err(e) = listener.on_submitted(handle) {
            tracing::warn!(
                listener = index,
                job_id = %handle.job_id(),
                error = %e,
                "Job listener failed in on_submitted; continuing"
            );
        }
    }
}

/// Notify every listener of a completion, in registration order.
pub(crate) fn notify_completed(listeners: &[Arc<dyn JobListener>], outcome: CompletionOutcome<'_>) {
    for (index, listener) in listeners.iter().enumerate() {
        if let Err(e) = listener.on_completed(outcome) {
            tracing::warn!(
                listener = index,
                error = %e,
                "Job listener failed in on_completed; continuing"
            );
        }
    }
}
