//! Train stage: training partition to model artifact

use super::{Stage, StageArtifact};
use crate::config::{PathsConfig, PipelineConfig};
use crate::error::{PipelineError, Result};
use crate::training::{Classifier, ModelArtifact, ModelConfig};
use crate::utils::frame::{column_names, first_column_to_array1, frame_to_array2};
use crate::utils::DataLoader;
use ndarray::Array1;
use tracing::{info, warn};

/// Fits the classifier on the training partition and saves it
pub struct TrainStage {
    model: ModelConfig,
    paths: PathsConfig,
}

impl TrainStage {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            model: config.model.clone(),
            paths: config.paths.clone(),
        }
    }
}

/// Labels must be exactly 0 or 1
pub(crate) fn check_binary_labels(y: &Array1<f64>) -> Result<()> {
    match y.iter().position(|v| *v != 0.0 && *v != 1.0) {
        Some(row) => Err(PipelineError::InvalidLabel(format!(
            "row {} has label {}, expected 0 or 1",
            row, y[row]
        ))),
        None => Ok(()),
    }
}

impl Stage for TrainStage {
    fn name(&self) -> &'static str {
        "train_model"
    }

    fn run(&self) -> Result<StageArtifact> {
        let (x_path, y_path) = (self.paths.x_train(), self.paths.y_train());
        info!(x = %x_path.display(), y = %y_path.display(), "reading training data");

        let loader = DataLoader::new();
        let x_df = loader.load_numeric_csv(&x_path)?;
        let y_df = loader.load_numeric_csv(&y_path)?;

        if x_df.height() == 0 || y_df.height() == 0 {
            return Err(PipelineError::EmptyDataset(format!(
                "training data is empty ({} feature rows, {} label rows)",
                x_df.height(),
                y_df.height()
            )));
        }
        if x_df.height() != y_df.height() {
            return Err(PipelineError::row_mismatch(
                "X_train",
                x_df.height(),
                "y_train",
                y_df.height(),
            ));
        }

        let x = frame_to_array2(&x_df)?;
        let y = first_column_to_array1(&y_df)?;
        check_binary_labels(&y)?;

        let mut model = self.model.build();
        info!(model = model.name(), rows = x.nrows(), features = x.ncols(), "fitting model");
        let fit = model.fit(&x, &y)?;
        if fit.converged {
            info!(iterations = fit.iterations, "model converged");
        } else {
            warn!(
                iterations = fit.iterations,
                "iteration cap reached before convergence; consider raising max_iter"
            );
        }

        let artifact = ModelArtifact::new(model, column_names(&x_df), fit);
        artifact.save(&self.paths.model)?;
        info!(path = %self.paths.model.display(), "model saved");

        Ok(StageArtifact::new(
            vec![self.paths.model.clone()],
            format!(
                "trained {} on {} rows in {} iterations",
                artifact.model.name(),
                artifact.fit.n_samples,
                artifact.fit.iterations
            ),
        ))
    }
}
