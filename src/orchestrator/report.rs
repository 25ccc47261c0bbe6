//! Run reports

use crate::stages::StageFailure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Success,
    Failed,
    /// Not run because an upstream task failed
    UpstreamFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Success,
    Failed,
}

/// Record of one task within a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRun {
    pub task_id: String,
    pub state: TaskState,
    pub attempts: u32,
    pub duration_ms: u64,
    /// Failure of the last attempt, if the task failed
    pub error: Option<StageFailure>,
}

impl TaskRun {
    pub(super) fn upstream_failed(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            state: TaskState::UpstreamFailed,
            attempts: 0,
            duration_ms: 0,
            error: None,
        }
    }
}

/// Record of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub dag_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub state: RunState,
    pub tasks: Vec<TaskRun>,
}

impl PipelineRun {
    pub fn is_success(&self) -> bool {
        self.state == RunState::Success
    }

    pub fn task(&self, task_id: &str) -> Option<&TaskRun> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    /// The task that failed the run, if any
    pub fn failed_task(&self) -> Option<&TaskRun> {
        self.tasks.iter().find(|t| t.state == TaskState::Failed)
    }
}
