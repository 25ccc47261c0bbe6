//! Utility functions and types

pub mod data_loader;
pub mod frame;
pub mod persist;

pub use data_loader::{DataLoader, DataSaver};
pub use persist::{write_atomic, AtomicBatch};

use std::time::Instant;

/// Simple wall-clock timer for stage logging
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
