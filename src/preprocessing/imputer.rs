//! Missing value imputation

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Strategy for imputing missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    /// Replace with the column median
    Median,
    /// Replace with the column mean
    Mean,
    /// Replace with a constant value
    Constant(f64),
}

/// Imputer for numeric columns.
///
/// Fill values are computed once over the whole frame passed to `fit`, so
/// fitting before the train/test split uses statistics of the entire table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: Vec<(String, f64)>,
    is_fitted: bool,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the imputer to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.fill_values.clear();
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::SchemaViolation {
                    missing: vec![col_name.to_string()],
                })?;

            let fill_value = self.compute_fill_value(column.as_materialized_series())?;
            self.fill_values.push((col_name.to_string(), fill_value));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data by imputing missing values
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::ComputationError(
                "imputer used before fit".to_string(),
            ));
        }

        let mut result = df.clone();
        for (col_name, fill_value) in &self.fill_values {
            let Ok(column) = df.column(col_name) else {
                continue;
            };
            let series = column.as_materialized_series();
            if series.null_count() == 0 {
                continue;
            }
            let filled = Self::fill_series(series, *fill_value)?;
            result.with_column(filled)?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Fill value computed for a column, if fitted
    pub fn fill_value(&self, column: &str) -> Option<f64> {
        self.fill_values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| *value)
    }

    fn compute_fill_value(&self, series: &Series) -> Result<f64> {
        let as_f64 = series.cast(&DataType::Float64)?;
        let ca = as_f64.f64()?;

        // A column with no observed values falls back to 0.0
        let value = match &self.strategy {
            ImputeStrategy::Median => ca.median().unwrap_or(0.0),
            ImputeStrategy::Mean => ca.mean().unwrap_or(0.0),
            ImputeStrategy::Constant(val) => *val,
        };
        Ok(value)
    }

    fn fill_series(series: &Series, fill_value: f64) -> Result<Series> {
        let as_f64 = series.cast(&DataType::Float64)?;
        let ca = as_f64.f64()?;

        let filled: Float64Chunked = ca
            .into_iter()
            .map(|opt| Some(opt.unwrap_or(fill_value)))
            .collect();

        Ok(filled.with_name(series.name().clone()).into_series())
    }
}
