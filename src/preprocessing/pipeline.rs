//! Raw table to scaled train/test partitions

use crate::error::{PipelineError, Result};
use crate::schema::{self, SchemaContract};
use super::{
    config::PreprocessingConfig,
    imputer::Imputer,
    scaler::{ScaleFit, StandardScaler},
    splitter::train_test_split,
};
use polars::prelude::*;

/// The four tables produced by preprocessing
#[derive(Debug, Clone)]
pub struct Partitions {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: DataFrame,
    pub y_test: DataFrame,
}

impl Partitions {
    pub fn train_rows(&self) -> usize {
        self.x_train.height()
    }

    pub fn test_rows(&self) -> usize {
        self.x_test.height()
    }
}

/// Summary of what preprocessing did, for logging
#[derive(Debug, Clone, Default)]
pub struct PreprocessReport {
    /// Columns that had nulls, with their null counts before imputation
    pub imputed: Vec<(String, usize)>,
    /// Columns in the raw table outside the schema contract
    pub dropped: Vec<String>,
}

/// Imputes, scales and splits a raw record table
#[derive(Debug, Clone)]
pub struct DataPreprocessor {
    config: PreprocessingConfig,
    schema: SchemaContract,
}

impl DataPreprocessor {
    pub fn new(config: PreprocessingConfig, schema: SchemaContract) -> Self {
        Self { config, schema }
    }

    /// Run the preprocessing steps in order: validate, impute, separate the
    /// label, scale, split.
    pub fn process(&self, raw: &DataFrame) -> Result<(Partitions, PreprocessReport)> {
        if raw.height() == 0 {
            return Err(PipelineError::EmptyDataset(
                "raw table has no rows".to_string(),
            ));
        }
        self.schema.validate(raw)?;

        let mut report = PreprocessReport {
            dropped: raw
                .get_column_names()
                .into_iter()
                .map(|name| name.to_string())
                .filter(|name| !self.schema.required_columns().contains(&name.as_str()))
                .collect(),
            ..Default::default()
        };
        if !report.dropped.is_empty() {
            tracing::debug!(columns = ?report.dropped, "dropping columns outside the schema contract");
        }

        let required = self.schema.required_columns();
        let mut table = raw.select(required.iter().copied())?;

        report.imputed = schema::null_counts(&table);
        if !report.imputed.is_empty() {
            tracing::warn!(
                "missing values found: {}",
                schema::format_null_counts(&report.imputed)
            );
            let mut imputer = Imputer::new(self.config.impute_strategy.clone());
            table = imputer.fit_transform(&table, &required)?;
            tracing::info!(strategy = ?self.config.impute_strategy, "missing values filled");
        }

        let features: Vec<&str> = self.schema.features.iter().map(String::as_str).collect();
        let x = table.select(features.iter().copied())?;
        let y = table.select([self.schema.label.as_str()])?;

        let split = train_test_split(x.height(), self.config.test_size, self.config.random_state)?;
        let train_idx = to_idx(&split.train);
        let test_idx = to_idx(&split.test);

        let (x_train, x_test) = match self.config.scale_fit {
            ScaleFit::FullDataset => {
                let mut scaler = StandardScaler::new();
                let scaled = scaler.fit_transform(&x, &features)?;
                (scaled.take(&train_idx)?, scaled.take(&test_idx)?)
            }
            ScaleFit::TrainPartition => {
                let x_train = x.take(&train_idx)?;
                let x_test = x.take(&test_idx)?;
                let mut scaler = StandardScaler::new();
                scaler.fit(&x_train, &features)?;
                (scaler.transform(&x_train)?, scaler.transform(&x_test)?)
            }
        };

        let partitions = Partitions {
            x_train,
            x_test,
            y_train: y.take(&train_idx)?,
            y_test: y.take(&test_idx)?,
        };
        Ok((partitions, report))
    }
}

fn to_idx(indices: &[usize]) -> IdxCa {
    let values: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    IdxCa::from_vec("idx".into(), values)
}
