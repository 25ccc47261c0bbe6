//! Model training module
//!
//! The learning algorithm is reached only through the [`Classifier`] trait;
//! [`TrainedModel`] is the serializable set of concrete implementations and
//! [`ModelArtifact`] is what the trainer persists and the evaluator loads.

mod artifact;
pub mod linear_models;

pub use artifact::{ModelArtifact, ARTIFACT_FORMAT_VERSION};
pub use linear_models::LogisticRegression;

use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A trainable binary classifier
pub trait Classifier {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<FitSummary>;

    /// Predict 0/1 labels
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Number of features the fitted model expects
    fn n_features(&self) -> Option<usize>;

    fn is_fitted(&self) -> bool;
}

/// Outcome of a single fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub n_samples: usize,
    pub n_features: usize,
    pub iterations: usize,
    pub converged: bool,
}

/// Serializable model variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrainedModel {
    LogisticRegression(LogisticRegression),
}

impl TrainedModel {
    fn as_classifier(&self) -> &dyn Classifier {
        match self {
            TrainedModel::LogisticRegression(m) => m,
        }
    }

    fn as_classifier_mut(&mut self) -> &mut dyn Classifier {
        match self {
            TrainedModel::LogisticRegression(m) => m,
        }
    }

    /// Short name of the algorithm
    pub fn name(&self) -> &'static str {
        match self {
            TrainedModel::LogisticRegression(_) => "logistic_regression",
        }
    }
}

impl Classifier for TrainedModel {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<FitSummary> {
        self.as_classifier_mut().fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.as_classifier().predict(x)
    }

    fn n_features(&self) -> Option<usize> {
        self.as_classifier().n_features()
    }

    fn is_fitted(&self) -> bool {
        self.as_classifier().is_fitted()
    }
}

/// Hyperparameters for the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// L2 regularization strength
    pub alpha: f64,
    /// Gradient descent step size
    pub learning_rate: f64,
    /// Iteration cap
    pub max_iter: usize,
    /// Gradient-norm tolerance for early stopping
    pub tol: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let base = LogisticRegression::new();
        Self {
            alpha: base.alpha,
            learning_rate: base.learning_rate,
            max_iter: base.max_iter,
            tol: base.tol,
        }
    }
}

impl ModelConfig {
    /// Builder method to set the iteration cap
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Build an unfitted model from this configuration
    pub fn build(&self) -> TrainedModel {
        TrainedModel::LogisticRegression(
            LogisticRegression::new()
                .with_alpha(self.alpha)
                .with_learning_rate(self.learning_rate)
                .with_max_iter(self.max_iter)
                .with_tol(self.tol),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_default_model_config() {
        let config = ModelConfig::default();
        assert_eq!(config.max_iter, 1000);
        assert!(config.alpha > 0.0);
    }

    #[test]
    fn test_build_and_fit_through_trait() {
        let mut model = ModelConfig::default().build();
        assert!(!model.is_fitted());

        let x = array![[0.0], [1.0], [9.0], [10.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        model.fit(&x, &y).unwrap();

        assert!(model.is_fitted());
        assert_eq!(model.n_features(), Some(1));
        assert_eq!(model.predict(&x).unwrap().len(), 4);
    }

    #[test]
    fn test_trained_model_tagged_json() {
        let model = ModelConfig::default().build();
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["type"], "logistic_regression");
    }
}
