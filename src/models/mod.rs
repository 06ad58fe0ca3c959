//! Forecasting models.

mod forecasting;
mod traits;

pub mod baseline;
pub mod time_based;

pub use forecasting::ForecastingCore;
pub use time_based::{TimeBasedEngine, TimeGrid, TOLERANCE};
pub use traits::{BoxedModel, ForecastingModel, ModelRegistry, ModelSpec, TimeBasedForecaster};
