//! Conversions between record tables and ndarray matrices

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Extract named columns into a row-major `Array2<f64>`.
///
/// Nulls are rejected: every stage downstream of preprocessing expects
/// fully populated tables.
pub fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|name| column_values(df, name))
        .collect::<Result<Vec<_>>>()?;

    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_data[c][r]))
}

/// Like [`columns_to_array2`], but nulls become NaN instead of an error
pub fn nullable_columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|name| {
            let column = df.column(name).map_err(|_| PipelineError::SchemaViolation {
                missing: vec![name.to_string()],
            })?;
            let as_f64 = column.cast(&DataType::Float64)?;
            Ok(as_f64.f64()?.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Array2::from_shape_fn((df.height(), col_names.len()), |(r, c)| {
        col_data[c][r]
    }))
}

/// Extract every column of the frame, in frame order
pub fn frame_to_array2(df: &DataFrame) -> Result<Array2<f64>> {
    columns_to_array2(df, &column_names(df))
}

/// Extract a single column as a vector
pub fn column_to_array1(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    Ok(Array1::from(column_values(df, name)?))
}

/// Extract the first column as a vector; used for single-column label tables
pub fn first_column_to_array1(df: &DataFrame) -> Result<Array1<f64>> {
    let name = df
        .get_column_names()
        .first()
        .map(|name| name.to_string())
        .ok_or_else(|| PipelineError::EmptyDataset("label table has no columns".to_string()))?;
    column_to_array1(df, &name)
}

/// Build a frame from a matrix and matching column names
pub fn array2_to_frame(names: &[String], x: &Array2<f64>) -> Result<DataFrame> {
    if names.len() != x.ncols() {
        return Err(PipelineError::ShapeMismatch {
            expected: format!("{} columns", names.len()),
            actual: format!("{} columns", x.ncols()),
        });
    }

    let columns: Vec<Column> = names
        .iter()
        .zip(x.columns())
        .map(|(name, values)| {
            // NaN marks a missing cell
            let cells: Vec<Option<f64>> = values
                .iter()
                .map(|v| if v.is_nan() { None } else { Some(*v) })
                .collect();
            Column::new(name.as_str().into(), cells)
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Column names of a frame as owned strings
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df.column(name).map_err(|_| PipelineError::SchemaViolation {
        missing: vec![name.to_string()],
    })?;
    let as_f64 = column.cast(&DataType::Float64)?;
    let ca = as_f64.f64()?;
    if ca.null_count() > 0 {
        return Err(PipelineError::DataError(format!(
            "column '{}' has {} missing values",
            name,
            ca.null_count()
        )));
    }
    Ok(ca.into_no_null_iter().collect())
}
