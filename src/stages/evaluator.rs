//! Evaluate stage: test partition and model to metrics

use super::{Stage, StageArtifact};
use crate::config::{PathsConfig, PipelineConfig};
use crate::error::{PipelineError, Result};
use crate::evaluation::MetricsRecord;
use crate::training::{Classifier, ModelArtifact};
use crate::utils::frame::{column_names, first_column_to_array1, frame_to_array2};
use crate::utils::{write_atomic, DataLoader};
use tracing::info;

/// Scores the saved model on the test partition
pub struct EvaluateStage {
    paths: PathsConfig,
}

impl EvaluateStage {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            paths: config.paths.clone(),
        }
    }
}

impl Stage for EvaluateStage {
    fn name(&self) -> &'static str {
        "evaluate_model"
    }

    fn run(&self) -> Result<StageArtifact> {
        let (x_path, y_path) = (self.paths.x_test(), self.paths.y_test());
        info!(x = %x_path.display(), y = %y_path.display(), "reading test data");

        let loader = DataLoader::new();
        let x_df = loader.load_numeric_csv(&x_path)?;
        let y_df = loader.load_numeric_csv(&y_path)?;

        if x_df.height() == 0 || y_df.height() == 0 {
            return Err(PipelineError::EmptyDataset(format!(
                "test data is empty ({} feature rows, {} label rows)",
                x_df.height(),
                y_df.height()
            )));
        }
        if x_df.height() != y_df.height() {
            return Err(PipelineError::row_mismatch(
                "X_test",
                x_df.height(),
                "y_test",
                y_df.height(),
            ));
        }

        info!(path = %self.paths.model.display(), "loading model");
        let artifact = ModelArtifact::load(&self.paths.model)?;

        // Same names in the same order as at fit time
        let test_columns = column_names(&x_df);
        if test_columns != artifact.feature_names {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("features {:?}", artifact.feature_names),
                actual: format!("features {:?}", test_columns),
            });
        }

        let x = frame_to_array2(&x_df)?;
        let y_true = first_column_to_array1(&y_df)?;
        let y_pred = artifact.model.predict(&x)?;

        let metrics = MetricsRecord::compute(&y_true, &y_pred)?;
        write_atomic(&self.paths.metrics, &metrics.to_json_bytes()?)?;
        info!(
            accuracy = metrics.accuracy,
            precision = metrics.precision,
            recall = metrics.recall,
            f1 = metrics.f1,
            path = %self.paths.metrics.display(),
            "metrics saved"
        );

        Ok(StageArtifact::new(
            vec![self.paths.metrics.clone()],
            format!(
                "accuracy {:.4}, precision {:.4}, recall {:.4}, f1 {:.4}",
                metrics.accuracy, metrics.precision, metrics.recall, metrics.f1
            ),
        ))
    }
}
