//! Data providers for the load stage
//!
//! A provider takes no parameters and returns a [`RawDataset`]: a feature
//! matrix, its column names and the label vector. NaN cells in the matrix
//! stand for missing values.

mod csv_table;
mod memory;
mod synthetic;
mod wdbc;

pub use csv_table::CsvTableProvider;
pub use memory::InMemoryProvider;
pub use synthetic::SyntheticProvider;
pub use wdbc::WdbcFileProvider;

use crate::error::{PipelineError, Result};
use crate::utils::frame::array2_to_frame;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source of the raw diagnostic dataset
pub trait DataProvider: Send + Sync {
    /// Short description used in log lines
    fn describe(&self) -> String;

    /// Produce the dataset
    fn fetch(&self) -> Result<RawDataset>;
}

/// Features, their names and labels as returned by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct RawDataset {
    pub features: Array2<f64>,
    pub feature_names: Vec<String>,
    pub target: Array1<f64>,
}

impl RawDataset {
    pub fn new(features: Array2<f64>, feature_names: Vec<String>, target: Array1<f64>) -> Self {
        Self {
            features,
            feature_names,
            target,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    /// Check that names, matrix and labels agree and that there is data
    pub fn check_shape(&self) -> Result<()> {
        if self.feature_names.len() != self.features.ncols() {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("{} feature columns", self.feature_names.len()),
                actual: format!("{} feature columns", self.features.ncols()),
            });
        }
        if self.target.len() != self.features.nrows() {
            return Err(PipelineError::row_mismatch(
                "features",
                self.features.nrows(),
                "target",
                self.target.len(),
            ));
        }
        if self.features.nrows() == 0 {
            return Err(PipelineError::EmptyDataset(
                "provider returned no rows".to_string(),
            ));
        }
        Ok(())
    }

    /// Build a record table: feature columns in order, then the label column
    pub fn to_frame(&self, label: &str) -> Result<DataFrame> {
        self.check_shape()?;

        let mut df = array2_to_frame(&self.feature_names, &self.features)?;
        let labels: Vec<Option<f64>> = self
            .target
            .iter()
            .map(|v| if v.is_nan() { None } else { Some(*v) })
            .collect();
        df.with_column(Column::new(label.into(), labels))?;
        Ok(df)
    }
}

/// Which provider the load stage uses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Seeded generator shaped like the diagnostic dataset
    Synthetic { n_samples: usize, seed: u64 },
    /// UCI `wdbc.data` file
    WdbcFile { path: PathBuf },
    /// CSV with a header naming the contract columns
    CsvTable { path: PathBuf, label: String },
}

/// Location of the UCI file, relative to the base directory
pub const DEFAULT_WDBC_PATH: &str = "data/wdbc.data";

/// The real 569 x 30 dataset, read from `<base_dir>/data/wdbc.data`
impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::WdbcFile {
            path: PathBuf::from(DEFAULT_WDBC_PATH),
        }
    }
}

impl ProviderConfig {
    /// The seeded generator at the dataset's size
    pub fn synthetic(seed: u64) -> Self {
        ProviderConfig::Synthetic {
            n_samples: synthetic::DEFAULT_SAMPLES,
            seed,
        }
    }

    /// Build the provider; relative file paths are resolved against `base_dir`
    pub fn build(&self, base_dir: &Path) -> Box<dyn DataProvider> {
        match self {
            ProviderConfig::Synthetic { n_samples, seed } => {
                Box::new(SyntheticProvider::new(*n_samples, *seed))
            }
            ProviderConfig::WdbcFile { path } => Box::new(WdbcFileProvider::new(base_dir.join(path))),
            ProviderConfig::CsvTable { path, label } => {
                Box::new(CsvTableProvider::new(base_dir.join(path)).with_label(label.clone()))
            }
        }
    }
}
