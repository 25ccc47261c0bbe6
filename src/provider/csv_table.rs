//! Provider reading a headed CSV table

use super::{DataProvider, RawDataset};
use crate::error::{PipelineError, Result};
use crate::schema::LABEL_COLUMN;
use crate::utils::frame::{column_names, column_to_array1, nullable_columns_to_array2};
use crate::utils::DataLoader;
use std::path::PathBuf;

/// Reads a CSV whose header already names the feature and label columns.
///
/// Every column other than the label is treated as a feature, in file order.
#[derive(Debug, Clone)]
pub struct CsvTableProvider {
    path: PathBuf,
    label: String,
}

impl CsvTableProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            label: LABEL_COLUMN.to_string(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl DataProvider for CsvTableProvider {
    fn describe(&self) -> String {
        format!("csv table {}", self.path.display())
    }

    fn fetch(&self) -> Result<RawDataset> {
        let df = DataLoader::new().load_numeric_csv(&self.path)?;
        if df.get_column_index(&self.label).is_none() {
            return Err(PipelineError::SchemaViolation {
                missing: vec![self.label.clone()],
            });
        }

        let feature_names: Vec<String> = column_names(&df)
            .into_iter()
            .filter(|name| *name != self.label)
            .collect();
        let features = nullable_columns_to_array2(&df, &feature_names)?;
        let target = column_to_array1(&df, &self.label)?;

        Ok(RawDataset::new(features, feature_names, target))
    }
}
