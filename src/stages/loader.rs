//! Load stage: provider to raw table

use super::{Stage, StageArtifact};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::provider::DataProvider;
use crate::schema::{self, SchemaContract};
use crate::utils::{write_atomic, DataSaver};
use std::path::PathBuf;
use tracing::{info, warn};

/// Fetches the dataset from a provider, validates it and writes the raw table
pub struct LoadStage {
    provider: Box<dyn DataProvider>,
    schema: SchemaContract,
    output: PathBuf,
}

impl LoadStage {
    /// Build the stage with the provider named in the configuration
    pub fn new(config: &PipelineConfig) -> Self {
        Self::with_provider(config, config.provider.build(&config.paths.base_dir))
    }

    pub fn with_provider(config: &PipelineConfig, provider: Box<dyn DataProvider>) -> Self {
        Self {
            provider,
            schema: config.schema.clone(),
            output: config.paths.raw_data.clone(),
        }
    }
}

impl Stage for LoadStage {
    fn name(&self) -> &'static str {
        "load_data"
    }

    fn run(&self) -> Result<StageArtifact> {
        info!(source = %self.provider.describe(), "loading dataset");
        let raw = self.provider.fetch()?;
        let df = raw.to_frame(&self.schema.label)?;

        self.schema.validate(&df)?;

        let nulls = schema::null_counts(&df);
        if !nulls.is_empty() {
            warn!("missing values found: {}", schema::format_null_counts(&nulls));
        }

        let bytes = DataSaver::to_csv_bytes(&df)?;
        let written = write_atomic(&self.output, &bytes)?;
        info!(path = %written.display(), rows = df.height(), "raw data saved");

        Ok(StageArtifact::new(
            vec![written],
            format!("loaded {} rows x {} columns", df.height(), df.width()),
        ))
    }
}
