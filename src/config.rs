//! Pipeline configuration
//!
//! One [`PipelineConfig`] is built at startup (defaults, optionally a JSON
//! file, then CLI overrides) and handed to every stage.

use crate::error::{PipelineError, Result};
use crate::orchestrator::{DailySchedule, RetryOn};
use crate::preprocessing::PreprocessingConfig;
use crate::provider::ProviderConfig;
use crate::schema::SchemaContract;
use crate::training::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Filesystem layout of one pipeline instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub base_dir: PathBuf,
    /// Raw table written by the load stage
    pub raw_data: PathBuf,
    /// Directory holding the four partition tables
    pub processed_dir: PathBuf,
    pub model: PathBuf,
    pub metrics: PathBuf,
    pub log_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self::from_base_dir(".")
    }
}

impl PathsConfig {
    /// Derive the standard layout under `base`
    pub fn from_base_dir(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            base_dir: base.to_path_buf(),
            raw_data: base.join("data").join("breast_cancer_wisconsin_diagnostic.csv"),
            processed_dir: base.join("data").join("processed"),
            model: base.join("results").join("model.json"),
            metrics: base.join("results").join("metrics.json"),
            log_file: base.join("logs").join("pipeline.log"),
        }
    }

    pub fn x_train(&self) -> PathBuf {
        self.processed_dir.join("X_train.csv")
    }

    pub fn x_test(&self) -> PathBuf {
        self.processed_dir.join("X_test.csv")
    }

    pub fn y_train(&self) -> PathBuf {
        self.processed_dir.join("y_train.csv")
    }

    pub fn y_test(&self) -> PathBuf {
        self.processed_dir.join("y_test.csv")
    }

    /// Create every directory the stages write into
    pub fn ensure_dirs(&self) -> Result<()> {
        let dirs = [
            self.raw_data.parent(),
            Some(self.processed_dir.as_path()),
            self.model.parent(),
            self.metrics.parent(),
            self.log_file.parent(),
        ];
        for dir in dirs.into_iter().flatten() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }
}

/// Retry, timeout and scheduling settings for the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    pub dag_id: String,

    /// Retries after the first attempt
    pub retries: u32,

    /// Delay before the first retry, in seconds
    pub retry_delay_secs: u64,

    /// Double the delay after every failed attempt
    pub exponential_backoff: bool,

    /// Upper bound on a single retry delay, in seconds
    pub max_retry_delay_secs: u64,

    /// Wall-clock limit per attempt, in seconds
    pub execution_timeout_secs: u64,

    /// Which failures are retried
    pub retry_on: RetryOn,

    pub schedule: DailySchedule,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            dag_id: "breast_cancer_ml_pipeline".to_string(),
            retries: 3,
            retry_delay_secs: 60,
            exponential_backoff: true,
            max_retry_delay_secs: 300,
            execution_timeout_secs: 300,
            retry_on: RetryOn::AllFailures,
            schedule: DailySchedule::default(),
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub schema: SchemaContract,
    pub preprocessing: PreprocessingConfig,
    pub model: ModelConfig,
    pub provider: ProviderConfig,
    pub orchestration: OrchestrationConfig,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration rooted at `base`
    pub fn with_base_dir(mut self, base: impl AsRef<Path>) -> Self {
        self.paths = PathsConfig::from_base_dir(base);
        self
    }

    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    pub fn with_orchestration(mut self, orchestration: OrchestrationConfig) -> Self {
        self.orchestration = orchestration;
        self
    }

    /// Load a JSON configuration file; absent fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            PipelineError::ConfigError(format!("invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no stage can run with
    pub fn validate(&self) -> Result<()> {
        let p = &self.preprocessing;
        if !(p.test_size > 0.0 && p.test_size < 1.0) {
            return Err(PipelineError::ConfigError(format!(
                "preprocessing.test_size must be in (0, 1), got {}",
                p.test_size
            )));
        }

        let m = &self.model;
        if m.max_iter == 0 {
            return Err(PipelineError::ConfigError(
                "model.max_iter must be at least 1".to_string(),
            ));
        }
        if !(m.learning_rate > 0.0) {
            return Err(PipelineError::ConfigError(format!(
                "model.learning_rate must be positive, got {}",
                m.learning_rate
            )));
        }
        if m.alpha < 0.0 {
            return Err(PipelineError::ConfigError(format!(
                "model.alpha must not be negative, got {}",
                m.alpha
            )));
        }

        if self.schema.label.is_empty() {
            return Err(PipelineError::ConfigError(
                "schema.label must name the label column".to_string(),
            ));
        }
        if self.schema.features.iter().any(|f| *f == self.schema.label) {
            return Err(PipelineError::ConfigError(format!(
                "schema.label '{}' is also listed as a feature",
                self.schema.label
            )));
        }

        let o = &self.orchestration;
        if o.max_retry_delay_secs < o.retry_delay_secs {
            return Err(PipelineError::ConfigError(format!(
                "orchestration.max_retry_delay_secs ({}) is below retry_delay_secs ({})",
                o.max_retry_delay_secs, o.retry_delay_secs
            )));
        }
        if o.execution_timeout_secs == 0 {
            return Err(PipelineError::ConfigError(
                "orchestration.execution_timeout_secs must be at least 1".to_string(),
            ));
        }
        o.schedule.validate()?;

        Ok(())
    }
}
