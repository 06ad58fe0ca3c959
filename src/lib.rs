//! # openforecast
//!
//! Time-based forecasting models with accuracy diagnostics.
//!
//! A model is trained on a [`Dataset`](core::Dataset) whose observations sit on
//! a regular time grid, then asked for forecasts at future or past time
//! points. Training scores the model on the observations that had a full
//! history window and reports AIC, bias, MAD, MAPE, MSE and SAE.
//!
//! Provided models are [`MovingAverage`](models::baseline::MovingAverage) and
//! [`WeightedMovingAverage`](models::baseline::WeightedMovingAverage). New
//! models implement [`TimeBasedForecaster`](models::TimeBasedForecaster) and
//! delegate training and caching to a [`TimeBasedEngine`](models::TimeBasedEngine).

pub mod core;
pub mod error;
pub mod models;
pub mod utils;

pub use error::{ErrorKind, ForecastError, Result};

pub mod prelude {
    pub use crate::core::{Dataset, Observation};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::baseline::{MovingAverage, WeightedMovingAverage};
    pub use crate::models::{ForecastingModel, TOLERANCE};
    pub use crate::utils::{AccuracyIndicators, IndicatorState};
}
