//! Diagnostic pipeline - file-mediated batch training for tabular diagnostics
//!
//! Four stages run in a fixed order and communicate only through files:
//! - Load: fetch the dataset from a provider and write the raw table
//! - Preprocess: impute, scale and split into train/test partitions
//! - Train: fit a logistic regression and save the model artifact
//! - Evaluate: score the model on the test partition and write metrics
//!
//! # Modules
//!
//! ## Stages and orchestration
//! - [`stages`] - The four stages behind the [`stages::Stage`] trait
//! - [`orchestrator`] - Sequential pipeline with retry, backoff and timeout
//!
//! ## Data and models
//! - [`provider`] - Dataset sources (UCI file, CSV table, synthetic)
//! - [`schema`] - Required column contract
//! - [`preprocessing`] - Imputation, scaling and splitting
//! - [`training`] - Classifier trait, logistic regression, model artifact
//! - [`evaluation`] - Classification metrics
//!
//! ## Infrastructure
//! - [`config`] - Pipeline configuration
//! - [`logging`] - Tracing subscriber setup
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data and models
pub mod schema;
pub mod provider;
pub mod preprocessing;
pub mod training;
pub mod evaluation;

// Stages and orchestration
pub mod stages;
pub mod orchestrator;

// Infrastructure
pub mod config;
pub mod logging;
pub mod utils;
pub mod cli;

pub use error::{PipelineError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{ErrorKind, PipelineError, Result};

    pub use crate::config::{OrchestrationConfig, PathsConfig, PipelineConfig};
    pub use crate::schema::{SchemaContract, FEATURE_COLUMNS, LABEL_COLUMN};

    pub use crate::provider::{
        CsvTableProvider, DataProvider, InMemoryProvider, ProviderConfig, RawDataset,
        SyntheticProvider, WdbcFileProvider,
    };
    pub use crate::preprocessing::{DataPreprocessor, PreprocessingConfig, ScaleFit};
    pub use crate::training::{Classifier, LogisticRegression, ModelArtifact, ModelConfig, TrainedModel};
    pub use crate::evaluation::MetricsRecord;

    pub use crate::stages::{
        EvaluateStage, LoadStage, PreprocessStage, Stage, StageArtifact, StageFailure,
        StageOutcome, TrainStage,
    };
    pub use crate::orchestrator::{
        DailySchedule, Pipeline, PipelineRun, RetryOn, TaskListener, TaskPolicy, TaskState,
    };
}
