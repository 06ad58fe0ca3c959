//! State shared by every model: the accuracy indicators and batch forecasting.

use crate::core::{Dataset, Observation};
use crate::error::{ForecastError, Result};
use crate::utils::{AccuracyIndicators, IndicatorState};

/// Holds a model's indicator state and runs batch forecasts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastingCore {
    state: IndicatorState,
}

impl ForecastingCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> IndicatorState {
        self.state
    }

    pub fn is_trained(&self) -> bool {
        self.state.is_initialized()
    }

    /// Fail with [`ForecastError::Uninitialized`] unless training has started
    /// evaluating or finished.
    pub fn require_trained(&self) -> Result<()> {
        if self.is_trained() {
            Ok(())
        } else {
            Err(ForecastError::Uninitialized)
        }
    }

    /// Mark the model as validated so the hold-out set can be forecast.
    pub(crate) fn begin_evaluation(&mut self) {
        self.state = IndicatorState::Default;
    }

    pub(crate) fn publish(&mut self, indicators: AccuracyIndicators) {
        self.state = IndicatorState::Computed(indicators);
    }

    pub(crate) fn reset(&mut self) {
        self.state = IndicatorState::Uninitialized;
    }

    /// Forecast every point of a copy of `dataset`.
    ///
    /// The input is never modified. The first failing point aborts the batch
    /// and its error is returned wrapped with the point's description.
    pub fn forecast_all<F>(&self, dataset: &Dataset, mut forecast: F) -> Result<Dataset>
    where
        F: FnMut(&Observation) -> Result<f64>,
    {
        self.require_trained()?;

        let mut result = dataset.clone();
        for point in result.iter_mut() {
            let value = forecast(&*point).map_err(|err| ForecastError::PointForecast {
                point: point.to_string(),
                source: Box::new(err),
            })?;
            point.set_dependent_value(value);
        }
        Ok(result)
    }
}
