//! Preprocess stage: raw table to four partition files

use super::{Stage, StageArtifact};
use crate::config::{PathsConfig, PipelineConfig};
use crate::error::Result;
use crate::preprocessing::DataPreprocessor;
use crate::utils::{AtomicBatch, DataLoader, DataSaver};
use tracing::info;

/// Imputes, scales and splits the raw table
pub struct PreprocessStage {
    preprocessor: DataPreprocessor,
    paths: PathsConfig,
}

impl PreprocessStage {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            preprocessor: DataPreprocessor::new(config.preprocessing.clone(), config.schema.clone()),
            paths: config.paths.clone(),
        }
    }
}

impl Stage for PreprocessStage {
    fn name(&self) -> &'static str {
        "preprocess_data"
    }

    fn run(&self) -> Result<StageArtifact> {
        info!(path = %self.paths.raw_data.display(), "reading raw data");
        let raw = DataLoader::new().load_numeric_csv(&self.paths.raw_data)?;

        let (parts, _report) = self.preprocessor.process(&raw)?;

        // All four tables are rendered before any of them is staged
        let outputs = [
            (self.paths.x_train(), DataSaver::to_csv_bytes(&parts.x_train)?),
            (self.paths.x_test(), DataSaver::to_csv_bytes(&parts.x_test)?),
            (self.paths.y_train(), DataSaver::to_csv_bytes(&parts.y_train)?),
            (self.paths.y_test(), DataSaver::to_csv_bytes(&parts.y_test)?),
        ];

        let mut batch = AtomicBatch::new();
        for (path, bytes) in &outputs {
            batch.stage(path, bytes)?;
        }
        let written = batch.commit()?;
        for path in &written {
            info!(path = %path.display(), "partition saved");
        }

        Ok(StageArtifact::new(
            written,
            format!(
                "preprocessed into {} train / {} test rows",
                parts.train_rows(),
                parts.test_rows()
            ),
        ))
    }
}
