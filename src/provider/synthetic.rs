//! Seeded generator for diagnostic-shaped data

use super::{DataProvider, RawDataset};
use crate::error::{PipelineError, Result};
use crate::schema::FEATURE_COLUMNS;
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

pub(super) const DEFAULT_SAMPLES: usize = 569;

/// Share of malignant (class 0) rows in the reference dataset, 212 of 569
const MALIGNANT_FRACTION: f64 = 212.0 / 569.0;

/// (benign mean, malignant mean) of the ten base measurements
const BASE_MEANS: [(f64, f64); 10] = [
    (12.15, 17.46),
    (17.91, 21.60),
    (78.08, 115.4),
    (462.8, 978.4),
    (0.0925, 0.1029),
    (0.0801, 0.1452),
    (0.0461, 0.1608),
    (0.0257, 0.0880),
    (0.1742, 0.1929),
    (0.0629, 0.0627),
];

/// Scale of the `* error` and `worst *` groups relative to the `mean *` group
const GROUP_SCALE: [f64; 3] = [1.0, 0.03, 1.2];

/// Generates a two-class dataset with the contract feature names.
///
/// The same seed always produces the same dataset.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    n_samples: usize,
    seed: u64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLES, 42)
    }
}

impl SyntheticProvider {
    pub fn new(n_samples: usize, seed: u64) -> Self {
        Self { n_samples, seed }
    }

    /// Standard normal sample via Box-Muller
    fn standard_normal(rng: &mut ChaCha8Rng) -> f64 {
        let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
        let u2: f64 = rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

impl DataProvider for SyntheticProvider {
    fn describe(&self) -> String {
        format!("synthetic ({} rows, seed {})", self.n_samples, self.seed)
    }

    fn fetch(&self) -> Result<RawDataset> {
        if self.n_samples == 0 {
            return Err(PipelineError::EmptyDataset(
                "synthetic provider configured with 0 samples".to_string(),
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let n_malignant = (self.n_samples as f64 * MALIGNANT_FRACTION).round() as usize;
        let mut labels: Vec<f64> = (0..self.n_samples)
            .map(|i| if i < n_malignant { 0.0 } else { 1.0 })
            .collect();
        labels.shuffle(&mut rng);

        let n_features = FEATURE_COLUMNS.len();
        let mut features = Array2::zeros((self.n_samples, n_features));
        for (row, label) in labels.iter().enumerate() {
            for col in 0..n_features {
                let (benign, malignant) = BASE_MEANS[col % BASE_MEANS.len()];
                let scale = GROUP_SCALE[col / BASE_MEANS.len()];
                let center = (if *label == 0.0 { malignant } else { benign }) * scale;
                let spread = 0.15 * (benign + malignant) / 2.0 * scale;
                let value = center + spread * Self::standard_normal(&mut rng);
                features[[row, col]] = value.max(0.0);
            }
        }

        Ok(RawDataset::new(
            features,
            FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            Array1::from(labels),
        ))
    }
}
