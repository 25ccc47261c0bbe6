//! Preprocessing configuration

use serde::{Deserialize, Serialize};
use super::{ImputeStrategy, ScaleFit};

/// Configuration for the preprocessing stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Strategy for filling missing values before scaling
    pub impute_strategy: ImputeStrategy,

    /// Which rows the scaler statistics are computed over
    pub scale_fit: ScaleFit,

    /// Fraction of rows placed in the test partition
    pub test_size: f64,

    /// Random seed for the train/test shuffle
    pub random_state: u64,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            impute_strategy: ImputeStrategy::Median,
            scale_fit: ScaleFit::TrainPartition,
            test_size: 0.2,
            random_state: 42,
        }
    }
}

impl PreprocessingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the scaler fitting mode
    pub fn with_scale_fit(mut self, scale_fit: ScaleFit) -> Self {
        self.scale_fit = scale_fit;
        self
    }

    /// Builder method to set the test fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Builder method to set the shuffle seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to set the impute strategy
    pub fn with_impute_strategy(mut self, strategy: ImputeStrategy) -> Self {
        self.impute_strategy = strategy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PreprocessingConfig::default();
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.impute_strategy, ImputeStrategy::Median);
        assert_eq!(config.scale_fit, ScaleFit::TrainPartition);
    }

    #[test]
    fn test_builder_pattern() {
        let config = PreprocessingConfig::new()
            .with_scale_fit(ScaleFit::FullDataset)
            .with_test_size(0.25)
            .with_random_state(7);

        assert_eq!(config.scale_fit, ScaleFit::FullDataset);
        assert_eq!(config.test_size, 0.25);
        assert_eq!(config.random_state, 7);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PreprocessingConfig =
            serde_json::from_str(r#"{"scale_fit": "full_dataset"}"#).unwrap();
        assert_eq!(config.scale_fit, ScaleFit::FullDataset);
        assert_eq!(config.random_state, 42);
    }
}
