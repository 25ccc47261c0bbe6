//! Provider for the UCI Wisconsin diagnostic breast cancer file

use super::{DataProvider, RawDataset};
use crate::error::{PipelineError, Result};
use crate::schema::FEATURE_COLUMNS;
use crate::utils::data_loader::to_float_frame;
use crate::utils::frame::{column_names, nullable_columns_to_array2};
use ndarray::Array1;
use polars::prelude::*;
use std::path::PathBuf;

/// id, diagnosis, then the 30 features
const WDBC_WIDTH: usize = 32;

/// Reads `wdbc.data`: no header, `id,diagnosis,f1..f30`.
///
/// Malignant (`M`) maps to 0 and benign (`B`) to 1.
#[derive(Debug, Clone)]
pub struct WdbcFileProvider {
    path: PathBuf,
}

impl WdbcFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_table(&self) -> Result<DataFrame> {
        CsvReadOptions::default()
            .with_has_header(false)
            .with_infer_schema_length(None)
            .try_into_reader_with_file_path(Some(self.path.clone()))?
            .finish()
            .map_err(|e| PipelineError::DataError(format!("{}: {}", self.path.display(), e)))
    }
}

fn diagnosis_to_label(value: Option<&str>, row: usize) -> Result<f64> {
    match value.map(str::trim) {
        Some("M") => Ok(0.0),
        Some("B") => Ok(1.0),
        other => Err(PipelineError::InvalidLabel(format!(
            "row {}: diagnosis {:?} is neither M nor B",
            row + 1,
            other
        ))),
    }
}

impl DataProvider for WdbcFileProvider {
    fn describe(&self) -> String {
        format!("wdbc file {}", self.path.display())
    }

    fn fetch(&self) -> Result<RawDataset> {
        if !self.path.is_file() {
            return Err(PipelineError::DataError(format!(
                "{} not found; place the UCI wdbc.data file there or configure another provider",
                self.path.display()
            )));
        }
        let df = self.read_table()?;
        if df.width() != WDBC_WIDTH {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("{} fields per record", WDBC_WIDTH),
                actual: format!("{} fields per record", df.width()),
            });
        }

        let columns = df.get_columns();
        let diagnosis = columns[1].cast(&DataType::String)?;
        let target = diagnosis
            .str()?
            .iter()
            .enumerate()
            .map(|(row, value)| diagnosis_to_label(value, row))
            .collect::<Result<Vec<f64>>>()?;

        let measurements = to_float_frame(&DataFrame::new(columns[2..].to_vec())?)?;
        let features = nullable_columns_to_array2(&measurements, &column_names(&measurements))?;

        Ok(RawDataset::new(
            features,
            FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            Array1::from(target),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn record(id: u32, diagnosis: &str, base: f64) -> String {
        let values: Vec<String> = (0..30).map(|j| format!("{}", base + j as f64)).collect();
        format!("{},{},{}\n", id, diagnosis, values.join(","))
    }

    #[test]
    fn test_parses_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}{}", record(842302, "M", 10.0), record(8510426, "B", 1.0)).unwrap();

        let raw = WdbcFileProvider::new(file.path()).fetch().unwrap();
        assert_eq!(raw.n_rows(), 2);
        assert_eq!(raw.feature_names.len(), 30);
        assert_eq!(raw.feature_names[0], "mean radius");
        assert_eq!(raw.target.to_vec(), vec![0.0, 1.0]);
        assert_eq!(raw.features[[0, 0]], 10.0);
        assert_eq!(raw.features[[1, 29]], 30.0);
    }

    #[test]
    fn test_unknown_diagnosis() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}{}", record(1, "M", 1.0), record(2, "X", 1.0)).unwrap();

        assert!(matches!(
            WdbcFileProvider::new(file.path()).fetch(),
            Err(PipelineError::InvalidLabel(_))
        ));
    }

    #[test]
    fn test_wrong_width() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "1,M,1.0,2.0\n").unwrap();

        assert!(matches!(
            WdbcFileProvider::new(file.path()).fetch(),
            Err(PipelineError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_data_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let provider = WdbcFileProvider::new(dir.path().join("wdbc.data"));

        match provider.fetch() {
            Err(PipelineError::DataError(msg)) => assert!(msg.contains("wdbc.data"), "{}", msg),
            other => panic!("expected DataError, got {:?}", other),
        }
    }
}
