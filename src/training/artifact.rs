//! Persisted model artifact

use crate::error::{PipelineError, Result};
use crate::utils::write_atomic;
use super::{Classifier, FitSummary, TrainedModel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Version of the on-disk artifact layout
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// A fitted model together with what it was trained on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub model: TrainedModel,
    pub feature_names: Vec<String>,
    pub fit: FitSummary,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    pub fn new(model: TrainedModel, feature_names: Vec<String>, fit: FitSummary) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            model,
            feature_names,
            fit,
            trained_at: Utc::now(),
        }
    }

    /// Atomically replace the artifact at `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &json)?;
        Ok(())
    }

    /// Load an artifact and check that it can predict.
    ///
    /// Unreadable files and invalid JSON propagate as I/O and serialization
    /// errors. Valid JSON that does not describe a fitted model is `NotAModel`.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&json)?;

        let artifact: Self = serde_json::from_value(value).map_err(|e| {
            PipelineError::NotAModel(format!("{} does not hold a model: {}", path.display(), e))
        })?;
        artifact.check_predictable()?;
        Ok(artifact)
    }

    fn check_predictable(&self) -> Result<()> {
        if !self.model.is_fitted() {
            return Err(PipelineError::NotAModel(format!(
                "{} model is not fitted",
                self.model.name()
            )));
        }
        match self.model.n_features() {
            Some(n) if n == self.feature_names.len() => Ok(()),
            other => Err(PipelineError::NotAModel(format!(
                "model expects {:?} features but lists {} feature names",
                other,
                self.feature_names.len()
            ))),
        }
    }
}
