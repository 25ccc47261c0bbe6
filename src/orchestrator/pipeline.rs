//! Linear task pipeline driven on a tokio runtime

use super::listener::{LoggingListener, TaskListener};
use super::policy::TaskPolicy;
use super::report::{PipelineRun, RunState, TaskRun, TaskState};
use super::schedule::DailySchedule;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::stages::{
    self, EvaluateStage, LoadStage, PreprocessStage, Stage, StageArtifact, StageFailure, TrainStage,
};
use crate::utils::Timer;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// A stage plus the policy it runs under
#[derive(Clone)]
pub struct Task {
    pub task_id: String,
    pub stage: Arc<dyn Stage>,
    pub policy: TaskPolicy,
}

impl Task {
    pub fn new(stage: Arc<dyn Stage>, policy: TaskPolicy) -> Self {
        Self {
            task_id: stage.name().to_string(),
            stage,
            policy,
        }
    }
}

/// Tasks run in insertion order; each depends on the one before it
pub struct Pipeline {
    dag_id: String,
    tasks: Vec<Task>,
    listeners: Vec<Arc<dyn TaskListener>>,
}

impl Pipeline {
    /// Empty pipeline with the logging listener attached
    pub fn new(dag_id: impl Into<String>) -> Self {
        Self {
            dag_id: dag_id.into(),
            tasks: Vec::new(),
            listeners: vec![Arc::new(LoggingListener)],
        }
    }

    /// The four-stage pipeline described by `config`
    pub fn from_config(config: &PipelineConfig) -> Self {
        let policy = TaskPolicy::from(&config.orchestration);
        Self::new(config.orchestration.dag_id.clone())
            .then(Arc::new(LoadStage::new(config)), policy.clone())
            .then(Arc::new(PreprocessStage::new(config)), policy.clone())
            .then(Arc::new(TrainStage::new(config)), policy.clone())
            .then(Arc::new(EvaluateStage::new(config)), policy)
    }

    /// Append a task downstream of the current last task
    pub fn then(mut self, stage: Arc<dyn Stage>, policy: TaskPolicy) -> Self {
        self.tasks.push(Task::new(stage, policy));
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn TaskListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn dag_id(&self) -> &str {
        &self.dag_id
    }

    pub fn task_ids(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.task_id.as_str()).collect()
    }

    /// Run every task in order. Never returns an error: failures are in the
    /// report.
    pub async fn run(&self) -> PipelineRun {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let span = info_span!("pipeline_run", dag = %self.dag_id, run = %run_id);

        async {
            info!(tasks = self.tasks.len(), "pipeline run started");

            let mut tasks = Vec::with_capacity(self.tasks.len());
            let mut failed = false;
            for task in &self.tasks {
                if failed {
                    info!(task = %task.task_id, "skipped, upstream failed");
                    tasks.push(TaskRun::upstream_failed(&task.task_id));
                    continue;
                }
                let run = self.run_task(task).await;
                failed = run.state == TaskState::Failed;
                tasks.push(run);
            }

            let state = if failed { RunState::Failed } else { RunState::Success };
            info!(state = ?state, "pipeline run finished");

            PipelineRun {
                run_id,
                dag_id: self.dag_id.clone(),
                started_at,
                finished_at: Utc::now(),
                state,
                tasks,
            }
        }
        .instrument(span)
        .await
    }

    async fn run_task(&self, task: &Task) -> TaskRun {
        let timer = Timer::start();
        let mut attempts = 0;
        let mut abandoned: Option<AttemptHandle> = None;

        loop {
            drain(&task.task_id, abandoned.take()).await;
            attempts += 1;
            let (outcome, timed_out) = attempt(task).await;
            abandoned = timed_out;
            let failure = match outcome {
                Ok(_) => {
                    let run = TaskRun {
                        task_id: task.task_id.clone(),
                        state: TaskState::Success,
                        attempts,
                        duration_ms: timer.elapsed_ms(),
                        error: None,
                    };
                    self.listeners.iter().for_each(|l| l.on_success(&run));
                    return run;
                }
                Err(err) => StageFailure::from(&err),
            };

            if task.policy.should_retry(failure.kind, attempts) {
                let delay = task.policy.delay(attempts);
                self.listeners
                    .iter()
                    .for_each(|l| l.on_retry(&task.task_id, attempts, delay, &failure));
                tokio::time::sleep(delay).await;
                continue;
            }

            drain(&task.task_id, abandoned.take()).await;
            let run = TaskRun {
                task_id: task.task_id.clone(),
                state: TaskState::Failed,
                attempts,
                duration_ms: timer.elapsed_ms(),
                error: Some(failure),
            };
            self.listeners.iter().for_each(|l| l.on_failure(&run));
            return run;
        }
    }

    /// Run once per day at the scheduled time, forever. Missed fire times
    /// are not caught up.
    pub async fn run_daily(&self, schedule: DailySchedule) -> Result<()> {
        loop {
            let now = Utc::now();
            let next = schedule.next_after(now)?;
            let wait = (next - now).to_std().unwrap_or_default();
            info!(next = %next, "waiting for next scheduled run");
            tokio::time::sleep(wait).await;

            let run = self.run().await;
            info!(run = %run.run_id, state = ?run.state, "scheduled run complete");
        }
    }
}

type AttemptHandle = JoinHandle<Result<StageArtifact>>;

/// One attempt on the blocking pool, bounded by the task's timeout.
///
/// A timed out attempt cannot be cancelled; its handle is returned so the
/// caller can wait for it before starting another.
async fn attempt(task: &Task) -> (Result<StageArtifact>, Option<AttemptHandle>) {
    let stage = Arc::clone(&task.stage);
    let mut handle = tokio::task::spawn_blocking(move || stages::run_logged(stage.as_ref()));

    match tokio::time::timeout(task.policy.execution_timeout, &mut handle).await {
        Ok(joined) => (flatten(&task.task_id, joined), None),
        Err(_) => {
            let err = PipelineError::Timeout {
                seconds: task.policy.execution_timeout.as_secs(),
            };
            tracing::error!(task = %task.task_id, "{}", err);
            (Err(err), Some(handle))
        }
    }
}

fn flatten(
    task_id: &str,
    joined: std::result::Result<Result<StageArtifact>, JoinError>,
) -> Result<StageArtifact> {
    joined.unwrap_or_else(|join_err| {
        Err(PipelineError::ComputationError(format!(
            "task {} panicked: {}",
            task_id, join_err
        )))
    })
}

/// Wait for a timed out attempt to finish so at most one runs at a time.
/// Its result is discarded.
async fn drain(task_id: &str, abandoned: Option<AttemptHandle>) {
    if let Some(handle) = abandoned {
        warn!(task = %task_id, "waiting for timed out attempt to finish");
        let late = flatten(task_id, handle.await);
        tracing::debug!(task = %task_id, ok = late.is_ok(), "timed out attempt finished");
    }
}
