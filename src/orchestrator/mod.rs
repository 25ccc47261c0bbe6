//! Sequential task orchestration
//!
//! A [`Pipeline`] is a linear chain of tasks. Each task wraps a stage and a
//! [`TaskPolicy`] (retries, exponential backoff, execution timeout). When a
//! task exhausts its retries the run fails and every downstream task is
//! recorded as `upstream_failed` without running.

mod listener;
mod pipeline;
mod policy;
mod report;
mod schedule;

pub use listener::{LoggingListener, TaskListener};
pub use pipeline::{Pipeline, Task};
pub use policy::{RetryOn, TaskPolicy};
pub use report::{PipelineRun, RunState, TaskRun, TaskState};
pub use schedule::DailySchedule;
