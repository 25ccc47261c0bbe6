//! Task lifecycle callbacks

use super::report::TaskRun;
use crate::stages::StageFailure;
use std::time::Duration;
use tracing::{error, info, warn};

/// Callbacks invoked by the pipeline as tasks finish or retry.
///
/// All methods default to doing nothing.
pub trait TaskListener: Send + Sync {
    fn on_success(&self, _run: &TaskRun) {}

    /// The task failed for good; no further attempts follow
    fn on_failure(&self, _run: &TaskRun) {}

    /// Attempt `attempt` failed and another follows after `delay`
    fn on_retry(&self, _task_id: &str, _attempt: u32, _delay: Duration, _failure: &StageFailure) {}
}

/// Logs every callback through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingListener;

impl TaskListener for LoggingListener {
    fn on_success(&self, run: &TaskRun) {
        info!(
            task = %run.task_id,
            attempts = run.attempts,
            duration_ms = run.duration_ms,
            "task succeeded"
        );
    }

    fn on_failure(&self, run: &TaskRun) {
        let message = run
            .error
            .as_ref()
            .map(|f| format!("{}: {}", f.kind, f.message))
            .unwrap_or_default();
        error!(
            task = %run.task_id,
            attempts = run.attempts,
            "task failed: {}",
            message
        );
    }

    fn on_retry(&self, task_id: &str, attempt: u32, delay: Duration, failure: &StageFailure) {
        warn!(
            task = task_id,
            attempt,
            delay_secs = delay.as_secs_f64(),
            kind = %failure.kind,
            "attempt failed, retrying: {}",
            failure.message
        );
    }
}
