//! Utility functions for forecasting models.

pub mod metrics;

pub use metrics::{calculate_indicators, AccuracyIndicators, IndicatorState};
