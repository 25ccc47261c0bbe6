//! Model evaluation

mod metrics;

pub use metrics::{ConfusionCounts, MetricsRecord};
