//! Moving Average forecasting model.

use super::weighted_moving_average::{WeightedMovingAverage, WeightedWindow};
use crate::core::{Dataset, Observation};
use crate::error::Result;
use crate::models::{ForecastingModel, TimeBasedEngine};
use crate::utils::IndicatorState;

/// Moving Average forecaster.
///
/// Forecasts the mean of the previous `period` grid points. This is a
/// [`WeightedMovingAverage`] with every weight equal to `1 / period`.
///
/// # Example
/// ```
/// use openforecast::core::{Dataset, Observation};
/// use openforecast::models::baseline::MovingAverage;
/// use openforecast::models::ForecastingModel;
///
/// let data = Dataset::from_values("t", 0.0, 1.0, &[1.0, 2.0, 3.0, 4.0, 5.0]);
///
/// let mut model = MovingAverage::new(3);
/// model.train(&data).unwrap();
///
/// // Mean of 3, 4, 5
/// let next = model.forecast(&Observation::new(0.0).with_value("t", 5.0)).unwrap();
/// assert!((next - 4.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct MovingAverage {
    inner: WeightedMovingAverage,
}

impl MovingAverage {
    /// Create a new Moving Average over `period` points.
    ///
    /// The period must be at least 1. If 0 is passed, it will be set to 1.
    pub fn new(period: usize) -> Self {
        Self {
            inner: WeightedMovingAverage::from_window(WeightedWindow::uniform(period)),
        }
    }

    pub fn period(&self) -> usize {
        self.inner.periods()
    }

    pub fn weights(&self) -> &[f64] {
        self.inner.weights()
    }

    pub fn engine(&self) -> &TimeBasedEngine {
        self.inner.engine()
    }

    pub fn forecast_time(&self, time_value: f64) -> Result<f64> {
        self.inner.forecast_time(time_value)
    }
}

impl ForecastingModel for MovingAverage {
    fn train(&mut self, dataset: &Dataset) -> Result<()> {
        self.inner.train(dataset)
    }

    fn forecast(&self, point: &Observation) -> Result<f64> {
        self.inner.forecast(point)
    }

    fn forecast_all(&self, dataset: &Dataset) -> Result<Dataset> {
        self.inner.forecast_all(dataset)
    }

    fn model_type(&self) -> &str {
        "Moving average"
    }

    fn number_of_predictors(&self) -> usize {
        self.inner.number_of_predictors()
    }

    fn indicator_state(&self) -> IndicatorState {
        self.inner.indicator_state()
    }
}
