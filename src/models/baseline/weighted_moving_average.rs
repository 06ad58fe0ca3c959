//! Weighted Moving Average forecasting model.
//!
//! The forecast at a time point is the weighted sum of the values at the
//! preceding `weights.len()` grid points. Observed values are used where they
//! exist, earlier forecasts otherwise.

use crate::core::{Dataset, Observation};
use crate::error::{ForecastError, Result};
use crate::models::time_based::TOLERANCE;
use crate::models::{ForecastingModel, TimeBasedEngine, TimeBasedForecaster};
use crate::utils::IndicatorState;

/// Normalized weights of a backward window.
///
/// `weights[len - 1]` applies to the most recent point, `weights[0]` to the
/// oldest.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WeightedWindow {
    weights: Vec<f64>,
}

impl WeightedWindow {
    /// Validate and normalize. Weights that do not sum to 1 are divided by their sum.
    fn new(weights: Vec<f64>) -> Result<Self> {
        if weights.is_empty() {
            return Err(ForecastError::illegal("at least one weight is required"));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(ForecastError::illegal(format!(
                "weights must be finite and non-negative, got {}",
                bad
            )));
        }

        let sum: f64 = weights.iter().sum();
        if sum <= TOLERANCE {
            return Err(ForecastError::illegal("weights must not sum to zero"));
        }
        if (sum - 1.0).abs() > TOLERANCE {
            return Ok(Self {
                weights: weights.iter().map(|w| w / sum).collect(),
            });
        }
        Ok(Self { weights })
    }

    /// Equal weights of `1 / period`.
    pub(crate) fn uniform(period: usize) -> Self {
        let period = period.max(1);
        Self {
            weights: vec![1.0 / period as f64; period],
        }
    }

    fn periods(&self) -> usize {
        self.weights.len()
    }
}

impl TimeBasedForecaster for WeightedWindow {
    fn min_periods(&self) -> usize {
        self.periods()
    }

    fn number_of_predictors(&self) -> usize {
        1
    }

    fn forecast_time(&self, engine: &TimeBasedEngine, time_value: f64) -> Result<f64> {
        let grid = engine.grid()?;
        let periods = self.periods();

        // Not enough history for a full window: reuse the recorded value.
        let window_start = time_value - grid.time_step * (periods as f64);
        if window_start < grid.min_time_value - TOLERANCE {
            return engine.get_observed_value(time_value);
        }

        let mut forecast = 0.0;
        for (back, weight) in self.weights.iter().rev().enumerate() {
            let t = time_value - grid.time_step * (back + 1) as f64;
            let value = match engine.get_observed_value(t) {
                Ok(v) => v,
                Err(ForecastError::NotFound { .. }) => engine.get_forecast_value(self, t)?,
                Err(err) => return Err(err),
            };
            forecast += weight * value;
        }
        Ok(forecast)
    }
}

/// Weighted Moving Average forecaster.
///
/// # Example
/// ```
/// use openforecast::core::{Dataset, Observation};
/// use openforecast::models::baseline::WeightedMovingAverage;
/// use openforecast::models::ForecastingModel;
///
/// let data = Dataset::from_values("t", 0.0, 1.0, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
///
/// // Weights are normalized to [1/6, 2/6, 3/6]; the last applies to the latest point.
/// let mut model = WeightedMovingAverage::new(vec![1.0, 2.0, 3.0]).unwrap();
/// model.train(&data).unwrap();
///
/// let next = model.forecast(&Observation::new(0.0).with_value("t", 6.0)).unwrap();
/// assert!((next - 16.0 / 3.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct WeightedMovingAverage {
    window: WeightedWindow,
    engine: TimeBasedEngine,
}

/// Builder for WeightedMovingAverage.
#[derive(Debug, Clone, Default)]
pub struct WmaBuilder {
    weights: Vec<f64>,
}

impl WmaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window weights, oldest first.
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = weights;
        self
    }

    pub fn build(self) -> Result<WeightedMovingAverage> {
        Ok(WeightedMovingAverage::from_window(WeightedWindow::new(
            self.weights,
        )?))
    }
}

impl WeightedMovingAverage {
    /// Create a model from raw weights, oldest first.
    pub fn new(weights: Vec<f64>) -> Result<Self> {
        Self::builder().weights(weights).build()
    }

    /// Create a builder for more complex configuration.
    pub fn builder() -> WmaBuilder {
        WmaBuilder::new()
    }

    pub(crate) fn from_window(window: WeightedWindow) -> Self {
        Self {
            window,
            engine: TimeBasedEngine::new(),
        }
    }

    /// Normalized weights, oldest first.
    pub fn weights(&self) -> &[f64] {
        &self.window.weights
    }

    /// Length of the backward window.
    pub fn periods(&self) -> usize {
        self.window.periods()
    }

    /// Training and cache state.
    pub fn engine(&self) -> &TimeBasedEngine {
        &self.engine
    }

    /// Forecast at a raw time value.
    pub fn forecast_time(&self, time_value: f64) -> Result<f64> {
        if !self.engine.is_trained() {
            return Err(ForecastError::Uninitialized);
        }
        self.engine.get_forecast_value(&self.window, time_value)
    }
}

impl ForecastingModel for WeightedMovingAverage {
    fn train(&mut self, dataset: &Dataset) -> Result<()> {
        self.engine.train(&self.window, dataset)
    }

    fn forecast(&self, point: &Observation) -> Result<f64> {
        self.engine.forecast(&self.window, point)
    }

    fn forecast_all(&self, dataset: &Dataset) -> Result<Dataset> {
        self.engine.forecast_all(&self.window, dataset)
    }

    fn model_type(&self) -> &str {
        "Weighted Moving Average"
    }

    fn number_of_predictors(&self) -> usize {
        self.window.number_of_predictors()
    }

    fn indicator_state(&self) -> IndicatorState {
        self.engine.indicator_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_relative_eq;

    fn linear(n: usize) -> Dataset {
        let values: Vec<f64> = (1..=n).map(|i| i as f64).collect();
        Dataset::from_values("t", 0.0, 1.0, &values)
    }

    fn at(t: f64) -> Observation {
        Observation::new(0.0).with_value("t", t)
    }

    #[test]
    fn weights_are_normalized() {
        let model = WeightedMovingAverage::new(vec![2.0, 2.0]).unwrap();
        assert_eq!(model.weights(), &[0.5, 0.5]);
        assert_eq!(model.periods(), 2);
    }

    #[test]
    fn weights_summing_to_one_are_kept() {
        let model = WeightedMovingAverage::new(vec![0.2, 0.3, 0.5]).unwrap();
        assert_eq!(model.weights(), &[0.2, 0.3, 0.5]);
    }

    #[test]
    fn builder_validates_weights() {
        assert!(matches!(
            WeightedMovingAverage::builder().build(),
            Err(ForecastError::IllegalArgument(_))
        ));
        assert!(matches!(
            WeightedMovingAverage::new(vec![1.0, -1.0]),
            Err(ForecastError::IllegalArgument(_))
        ));
        assert!(matches!(
            WeightedMovingAverage::new(vec![1.0, f64::NAN]),
            Err(ForecastError::IllegalArgument(_))
        ));
        assert!(matches!(
            WeightedMovingAverage::new(vec![0.0, 0.0]),
            Err(ForecastError::IllegalArgument(_))
        ));
    }

    #[test]
    fn latest_point_gets_last_weight() {
        let mut model = WeightedMovingAverage::new(vec![1.0, 2.0, 3.0]).unwrap();
        model.train(&linear(6)).unwrap();

        // 6 * 3/6 + 5 * 2/6 + 4 * 1/6
        let value = model.forecast(&at(6.0)).unwrap();
        assert_relative_eq!(value, 16.0 / 3.0, epsilon = 1e-10);
    }

    #[test]
    fn points_without_full_history_reuse_observations() {
        let mut model = WeightedMovingAverage::new(vec![1.0, 1.0, 1.0]).unwrap();
        model.train(&linear(6)).unwrap();

        assert_relative_eq!(model.forecast(&at(0.0)).unwrap(), 1.0);
        assert_relative_eq!(model.forecast(&at(2.0)).unwrap(), 3.0);
        // t=3 has a full window: mean of 1, 2, 3
        assert_relative_eq!(model.forecast(&at(3.0)).unwrap(), 2.0, epsilon = 1e-10);
    }

    #[test]
    fn multi_step_uses_cached_forecasts() {
        let mut model = WeightedMovingAverage::new(vec![1.0, 1.0]).unwrap();
        model.train(&linear(4)).unwrap();

        // t=4: mean(3, 4) = 3.5; t=5: mean(4, 3.5) = 3.75
        assert_relative_eq!(model.forecast_time(5.0).unwrap(), 3.75, epsilon = 1e-10);
        assert_relative_eq!(model.forecast_time(4.0).unwrap(), 3.5, epsilon = 1e-10);
    }

    #[test]
    fn long_horizon_converges_without_overflowing() {
        let mut model = WeightedMovingAverage::new(vec![1.0, 1.0, 1.0]).unwrap();
        model.train(&linear(10)).unwrap();

        for t in [1_000.0, 10_009.0, 100_000.0] {
            let value = model.forecast_time(t).unwrap();
            assert!((8.0..=10.0).contains(&value), "t={} gave {}", t, value);
        }
        // Repeated averaging of 8, 9, 10 settles on a fixed point.
        assert_relative_eq!(
            model.forecast_time(100_000.0).unwrap(),
            model.forecast_time(99_999.0).unwrap(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn holdout_indicators() {
        let mut model = WeightedMovingAverage::new(vec![1.0, 1.0, 1.0]).unwrap();
        model.train(&linear(10)).unwrap();

        // Each hold-out forecast trails the actual value by 2.
        assert_relative_eq!(model.bias(), -2.0, epsilon = 1e-10);
        assert_relative_eq!(model.mad(), 2.0, epsilon = 1e-10);
        assert_relative_eq!(model.mse(), 4.0, epsilon = 1e-10);
        assert_relative_eq!(model.sae(), 14.0, epsilon = 1e-10);
        assert!(model.aic().is_finite());
    }

    #[test]
    fn short_dataset_is_rejected() {
        let mut model = WeightedMovingAverage::new(vec![1.0; 5]).unwrap();
        let err = model.train(&linear(4)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalArgument);
        assert!(!model.is_trained());
    }

    #[test]
    fn forecast_before_training() {
        let model = WeightedMovingAverage::new(vec![1.0, 2.0]).unwrap();
        assert_eq!(model.forecast(&at(1.0)), Err(ForecastError::Uninitialized));
        assert_eq!(model.forecast_time(1.0), Err(ForecastError::Uninitialized));
        assert_eq!(
            model.forecast_all(&linear(3)),
            Err(ForecastError::Uninitialized)
        );
        assert_eq!(model.mse(), -1.0);
    }

    #[test]
    fn off_grid_point_before_full_window_is_not_found() {
        let mut model = WeightedMovingAverage::new(vec![1.0, 1.0]).unwrap();
        model.train(&linear(5)).unwrap();

        let err = model.forecast(&at(1.5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn forecast_all_reports_failing_point() {
        let mut model = WeightedMovingAverage::new(vec![1.0, 1.0]).unwrap();
        model.train(&linear(5)).unwrap();

        let query = Dataset::builder()
            .observation(0.0, [("t", 5.0)])
            .observation(0.0, [("t", 0.5)])
            .build();
        let err = model.forecast_all(&query).unwrap_err();

        assert!(matches!(err, ForecastError::PointForecast { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("t=0.5"));
    }

    #[test]
    fn type_and_predictors() {
        let model = WeightedMovingAverage::new(vec![1.0]).unwrap();
        assert_eq!(model.model_type(), "Weighted Moving Average");
        assert_eq!(model.number_of_predictors(), 1);
    }
}
