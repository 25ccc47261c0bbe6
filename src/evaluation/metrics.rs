//! Binary classification metrics with positive class 1

use crate::error::{PipelineError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Confusion matrix counts for a binary problem
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl ConfusionCounts {
    /// Count outcomes; labels are 0/1, anything >= 0.5 counts as positive
    pub fn from_labels(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }

        let mut counts = Self::default();
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t >= 0.5, *p >= 0.5) {
                (true, true) => counts.tp += 1,
                (false, true) => counts.fp += 1,
                (false, false) => counts.tn += 1,
                (true, false) => counts.fn_ += 1,
            }
        }
        Ok(counts)
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }
}

/// The persisted metrics document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl MetricsRecord {
    /// Compute metrics from true and predicted labels.
    ///
    /// A zero denominator yields 0.0 for the affected metric and logs a
    /// warning.
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        let counts = ConfusionCounts::from_labels(y_true, y_pred)?;
        if counts.total() == 0 {
            return Err(PipelineError::EmptyDataset(
                "no predictions to score".to_string(),
            ));
        }
        Ok(Self::from_counts(&counts))
    }

    pub fn from_counts(counts: &ConfusionCounts) -> Self {
        let accuracy = ratio("accuracy", counts.tp + counts.tn, counts.total());
        let precision = ratio("precision", counts.tp, counts.tp + counts.fp);
        let recall = ratio("recall", counts.tp, counts.tp + counts.fn_);

        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            tracing::warn!("f1 is ill-defined with precision and recall both 0; set to 0.0");
            0.0
        };

        Self {
            accuracy,
            precision,
            recall,
            f1,
        }
    }

    /// Pretty JSON with exactly the four metric keys
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

fn ratio(metric: &str, numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        tracing::warn!(metric, "ill-defined due to zero denominator; set to 0.0");
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
