//! Seeded train/test split

use crate::error::{PipelineError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Row indices of a train/test split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_samples` with a seeded RNG and cut it into test and train.
///
/// The test partition holds `ceil(test_size * n_samples)` rows and takes the
/// head of the permutation; the train partition takes the rest. Both must be
/// non-empty.
pub fn train_test_split(n_samples: usize, test_size: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::ConfigError(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n_test = (test_size * n_samples as f64).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(PipelineError::EmptyDataset(format!(
            "{} rows cannot be split into non-empty partitions with test_size {}",
            n_samples, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    tracing::debug!(
        train_rows = train.len(),
        test_rows = indices.len(),
        seed,
        "split rows into train/test"
    );

    Ok(SplitIndices {
        train,
        test: indices,
    })
}
