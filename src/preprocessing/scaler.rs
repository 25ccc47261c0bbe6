//! Standard (z-score) feature scaling

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Which rows the scaling statistics are computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleFit {
    /// Fit on the training partition only and apply to both partitions
    TrainPartition,
    /// Fit on the full feature set before splitting. Leaks test-set
    /// statistics into training; kept for parity with earlier outputs.
    FullDataset,
}

/// Parameters for one fitted column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    mean: f64,
    scale: f64,
}

/// Standard scaler: (x - mean) / std with population standard deviation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<(String, ScalerParams)>,
    is_fitted: bool,
}

impl StandardScaler {
    /// Create a new scaler
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        if df.height() == 0 {
            return Err(PipelineError::EmptyDataset(
                "cannot fit scaler on zero rows".to_string(),
            ));
        }

        self.params.clear();
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::SchemaViolation {
                    missing: vec![col_name.to_string()],
                })?;

            let params = Self::compute_params(column.as_materialized_series())?;
            self.params.push((col_name.to_string(), params));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data.
    /// Builds all scaled columns first, then replaces them in place.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::ComputationError(
                "scaler used before fit".to_string(),
            ));
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .map(|(col_name, params)| {
                let column = df.column(col_name).map_err(|_| {
                    PipelineError::SchemaViolation {
                        missing: vec![col_name.clone()],
                    }
                })?;
                Self::scale_series(column.as_materialized_series(), params)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result.with_column(scaled)?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Fitted (mean, scale) for a column
    pub fn column_params(&self, column: &str) -> Option<(f64, f64)> {
        self.params
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, p)| (p.mean, p.scale))
    }

    fn compute_params(series: &Series) -> Result<ScalerParams> {
        let as_f64 = series.cast(&DataType::Float64)?;
        let ca = as_f64.f64()?;

        let mean = ca.mean().unwrap_or(0.0);
        let std = ca.std(0).unwrap_or(0.0);
        Ok(ScalerParams {
            mean,
            scale: if std == 0.0 || !std.is_finite() { 1.0 } else { std },
        })
    }

    fn scale_series(series: &Series, params: &ScalerParams) -> Result<Series> {
        let as_f64 = series.cast(&DataType::Float64)?;
        let ca = as_f64.f64()?;

        let scaled: Float64Chunked = ca
            .into_iter()
            .map(|opt| opt.map(|v| (v - params.mean) / params.scale))
            .collect();

        Ok(scaled.with_name(series.name().clone()).into_series())
    }
}
