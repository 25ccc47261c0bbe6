use super::{DataProvider, RawDataset};
use crate::error::Result;

/// Serves a dataset that is already in memory
#[derive(Debug, Clone)]
pub struct InMemoryProvider {
    dataset: RawDataset,
}

impl InMemoryProvider {
    pub fn new(dataset: RawDataset) -> Self {
        Self { dataset }
    }
}

impl DataProvider for InMemoryProvider {
    fn describe(&self) -> String {
        format!("in-memory dataset ({} rows)", self.dataset.n_rows())
    }

    fn fetch(&self) -> Result<RawDataset> {
        Ok(self.dataset.clone())
    }
}
