//! Core data structures for observations and datasets.

mod dataset;
mod observation;

pub use dataset::{Dataset, DatasetBuilder};
pub use observation::{IndependentValues, Observation};
