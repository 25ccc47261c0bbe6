//! The four pipeline stages
//!
//! Stages share no in-memory state: each reads the files written by its
//! predecessor and atomically replaces its own outputs. Re-running a stage on
//! unchanged inputs produces the same outputs.

mod evaluator;
mod loader;
mod preprocessor;
mod trainer;

pub use evaluator::EvaluateStage;
pub use loader::LoadStage;
pub use preprocessor::PreprocessStage;
pub use trainer::TrainStage;

use crate::error::{ErrorKind, PipelineError, Result};
use crate::utils::Timer;
use serde::{Deserialize, Serialize};
use std::backtrace::Backtrace;
use std::path::PathBuf;
use tracing::{error, info};

/// A unit of work the orchestrator can run and retry
pub trait Stage: Send + Sync {
    /// Task identifier, stable across runs
    fn name(&self) -> &'static str;

    /// Do the work once. Outputs are either fully replaced or untouched.
    fn run(&self) -> Result<StageArtifact>;
}

/// What a successful stage produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageArtifact {
    pub outputs: Vec<PathBuf>,
    pub summary: String,
}

impl StageArtifact {
    pub fn new(outputs: Vec<PathBuf>, summary: impl Into<String>) -> Self {
        Self {
            outputs,
            summary: summary.into(),
        }
    }
}

/// Failure classification carried in run reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&PipelineError> for StageFailure {
    fn from(err: &PipelineError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result of one stage attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StageOutcome {
    Success(StageArtifact),
    Failure(StageFailure),
}

impl StageOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StageOutcome::Success(_))
    }
}

/// Run a stage with start/finish logging. Errors are logged with a captured
/// backtrace and returned unchanged.
pub fn run_logged(stage: &dyn Stage) -> Result<StageArtifact> {
    let timer = Timer::start();
    info!(stage = stage.name(), "stage started");

    match stage.run() {
        Ok(artifact) => {
            info!(
                stage = stage.name(),
                elapsed_ms = timer.elapsed_ms(),
                outputs = artifact.outputs.len(),
                "{}",
                artifact.summary
            );
            Ok(artifact)
        }
        Err(err) => {
            error!(
                stage = stage.name(),
                kind = %err.kind(),
                elapsed_ms = timer.elapsed_ms(),
                "stage failed: {}\n{}",
                err,
                Backtrace::force_capture()
            );
            Err(err)
        }
    }
}

/// Run a stage once and fold the result into a [`StageOutcome`]
pub fn execute(stage: &dyn Stage) -> StageOutcome {
    match run_logged(stage) {
        Ok(artifact) => StageOutcome::Success(artifact),
        Err(err) => StageOutcome::Failure(StageFailure::from(&err)),
    }
}
