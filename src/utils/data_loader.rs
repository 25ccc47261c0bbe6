//! CSV loading and saving for record tables

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Reads record tables from CSV files
#[derive(Debug, Clone, Default)]
pub struct DataLoader {
    /// Rows scanned for schema inference; `None` scans the whole file
    infer_schema_length: Option<usize>,
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of rows used for schema inference
    pub fn with_infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Load a CSV file with a header row as-is
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path).map_err(|e| {
            PipelineError::DataError(format!("cannot open {}: {}", path.display(), e))
        })?;

        // A zero-byte file is an empty table, not a parse error
        if file.metadata()?.len() == 0 {
            return Ok(DataFrame::empty());
        }

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| PipelineError::DataError(format!("{}: {}", path.display(), e)))
    }

    /// Load a CSV file and cast every column to `Float64`.
    ///
    /// Empty cells become nulls; a non-numeric value is a data error naming
    /// the offending column.
    pub fn load_numeric_csv(&self, path: &Path) -> Result<DataFrame> {
        let df = self.load_csv(path)?;
        to_float_frame(&df)
    }
}

/// Cast all columns of a frame to `Float64`, strictly
pub fn to_float_frame(df: &DataFrame) -> Result<DataFrame> {
    let columns: Vec<Column> = df
        .get_columns()
        .iter()
        .map(|column| {
            column.strict_cast(&DataType::Float64).map_err(|e| {
                PipelineError::DataError(format!(
                    "column '{}' is not numeric: {}",
                    column.name(),
                    e
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DataFrame::new(columns)?)
}

/// Serializes record tables to CSV
pub struct DataSaver;

impl DataSaver {
    /// Render a frame as CSV bytes with a header row
    pub fn to_csv_bytes(df: &DataFrame) -> Result<Vec<u8>> {
        let mut frame = df.clone();
        let mut buf = Vec::new();
        CsvWriter::new(&mut buf)
            .include_header(true)
            .finish(&mut frame)
            .map_err(|e| PipelineError::DataError(e.to_string()))?;
        Ok(buf)
    }
}
