//! Data preprocessing module
//!
//! Turns a raw record table into scaled train/test partitions:
//! - Missing value imputation (median by default, over the whole table)
//! - Standard scaling with a configurable fitting scope
//! - Seeded shuffle split

mod config;
mod imputer;
mod pipeline;
mod scaler;
pub mod splitter;

pub use config::PreprocessingConfig;
pub use imputer::{ImputeStrategy, Imputer};
pub use pipeline::{DataPreprocessor, Partitions, PreprocessReport};
pub use scaler::{ScaleFit, StandardScaler};
pub use splitter::{train_test_split, SplitIndices};
