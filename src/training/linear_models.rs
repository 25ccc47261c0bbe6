//! Linear model implementations

use crate::error::{PipelineError, Result};
use super::{Classifier, FitSummary};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Logistic regression for binary classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Regularization strength (L2)
    pub alpha: f64,
    /// Maximum iterations
    pub max_iter: usize,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    /// Learning rate
    pub learning_rate: f64,
    /// Whether model is fitted
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new logistic regression model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            alpha: 0.01,
            max_iter: 1000,
            tol: 1e-4,
            learning_rate: 0.1,
            is_fitted: false,
        }
    }

    /// Set regularization strength
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set learning rate
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Set convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Sigmoid function
    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// Predict probabilities of the positive class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (coefficients, intercept) = match (&self.coefficients, self.intercept) {
            (Some(c), Some(b)) if self.is_fitted => (c, b),
            _ => {
                return Err(PipelineError::NotAModel(
                    "logistic regression has not been fitted".to_string(),
                ))
            }
        };

        if x.ncols() != coefficients.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("{} feature columns", coefficients.len()),
                actual: format!("{} feature columns", x.ncols()),
            });
        }

        let linear = x.dot(coefficients) + intercept;
        Ok(Self::sigmoid(&linear))
    }
}

impl Classifier for LogisticRegression {
    /// Fit with full-batch gradient descent until the gradient norm drops
    /// below `tol` or `max_iter` is reached
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<FitSummary> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples == 0 {
            return Err(PipelineError::EmptyDataset(
                "no training samples".to_string(),
            ));
        }
        if n_samples != y.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        let mut weights = Array1::zeros(n_features);
        let mut bias = 0.0;
        let lr = self.learning_rate;
        let alpha = self.alpha;

        let mut iterations = 0;
        let mut converged = false;
        for _ in 0..self.max_iter {
            iterations += 1;

            let linear = x.dot(&weights) + bias;
            let predictions = Self::sigmoid(&linear);

            let errors = &predictions - y;
            let dw = (x.t().dot(&errors) / n_samples as f64) + (alpha * &weights);
            let db = errors.mean().unwrap_or(0.0);

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if !grad_norm.is_finite() {
                return Err(PipelineError::ComputationError(format!(
                    "gradient diverged at iteration {}",
                    iterations
                )));
            }
            if grad_norm < self.tol {
                converged = true;
                break;
            }

            weights = weights - lr * dw;
            bias -= lr * db;
        }

        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        self.is_fitted = true;

        Ok(FitSummary {
            n_samples,
            n_features,
            iterations,
            converged,
        })
    }

    /// Predict class labels (threshold 0.5)
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    fn n_features(&self) -> Option<usize> {
        self.coefficients.as_ref().map(|c| c.len())
    }

    fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
