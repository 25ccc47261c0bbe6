//! Schema contract shared by the table-producing stages

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Name of the binary label column
pub const LABEL_COLUMN: &str = "target";

/// The 30 numeric features of the diagnostic dataset, in canonical order
pub const FEATURE_COLUMNS: [&str; 30] = [
    "mean radius",
    "mean texture",
    "mean perimeter",
    "mean area",
    "mean smoothness",
    "mean compactness",
    "mean concavity",
    "mean concave points",
    "mean symmetry",
    "mean fractal dimension",
    "radius error",
    "texture error",
    "perimeter error",
    "area error",
    "smoothness error",
    "compactness error",
    "concavity error",
    "concave points error",
    "symmetry error",
    "fractal dimension error",
    "worst radius",
    "worst texture",
    "worst perimeter",
    "worst area",
    "worst smoothness",
    "worst compactness",
    "worst concavity",
    "worst concave points",
    "worst symmetry",
    "worst fractal dimension",
];

/// Set of column names every table-producing stage must satisfy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaContract {
    pub features: Vec<String>,
    pub label: String,
}

impl Default for SchemaContract {
    fn default() -> Self {
        Self {
            features: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            label: LABEL_COLUMN.to_string(),
        }
    }
}

impl SchemaContract {
    /// Create a contract from explicit feature names and a label column
    pub fn new(features: Vec<String>, label: impl Into<String>) -> Self {
        Self {
            features,
            label: label.into(),
        }
    }

    /// All required columns: features followed by the label
    pub fn required_columns(&self) -> Vec<&str> {
        self.features
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.label.as_str()))
            .collect()
    }

    /// Number of required columns, label included
    pub fn column_count(&self) -> usize {
        self.features.len() + 1
    }

    /// Required columns absent from `df`, in contract order
    pub fn missing_columns(&self, df: &DataFrame) -> Vec<String> {
        let present: Vec<&str> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect();

        self.required_columns()
            .into_iter()
            .filter(|col| !present.contains(col))
            .map(str::to_string)
            .collect()
    }

    /// Fail with `SchemaViolation` when any required column is missing
    pub fn validate(&self, df: &DataFrame) -> Result<()> {
        let missing = self.missing_columns(df);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::SchemaViolation { missing })
        }
    }
}

/// Per-column null counts, only for columns that contain nulls
pub fn null_counts(df: &DataFrame) -> Vec<(String, usize)> {
    df.get_columns()
        .iter()
        .filter(|col| col.null_count() > 0)
        .map(|col| (col.name().to_string(), col.null_count()))
        .collect()
}

/// Render null counts as `name: count` lines for a log message
pub fn format_null_counts(counts: &[(String, usize)]) -> String {
    counts
        .iter()
        .map(|(name, count)| format!("{}: {}", name, count))
        .collect::<Vec<_>>()
        .join(", ")
}
