//! Training protocol and forecast cache shared by time-based models.
//!
//! A time-based model forecasts the dependent value as a function of a single
//! time variable. Training checks that the observations sit on a regular time
//! grid, primes the forecast cache for every observed time point, then scores
//! the model on the observations that had a full history window behind them.
//!
//! Forecasts are cached by time value. Two time values closer than
//! [`TOLERANCE`] are the same point, and the cache never holds two entries for
//! one point. A query past the cached range first fills the grid points
//! leading up to it, oldest first, so the cost grows linearly with the horizon
//! and recursion stays one window deep.

use crate::core::{Dataset, Observation};
use crate::error::{ForecastError, Result};
use crate::models::{ForecastingCore, TimeBasedForecaster};
use crate::utils::{AccuracyIndicators, IndicatorState};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Largest difference between two time values that are still treated as equal.
pub const TOLERANCE: f64 = 1e-8;

/// Regular time grid discovered during training.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    /// Independent variable used as the time axis
    pub time_variable: String,
    /// Constant distance between consecutive observations
    pub time_step: f64,
    /// Earliest observed time value
    pub min_time_value: f64,
}

/// Finite time value ordered by [`f64::total_cmp`], usable as a map key.
#[derive(Debug, Clone, Copy)]
struct TimeKey(f64);

impl PartialEq for TimeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeKey {}

impl PartialOrd for TimeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Cached forecasts ordered by time, plus the latest known time value.
#[derive(Debug, Clone, Default)]
struct ForecastCache {
    entries: BTreeMap<TimeKey, f64>,
    max_time_value: f64,
}

impl ForecastCache {
    fn lookup(&self, time_value: f64) -> Option<f64> {
        self.entries
            .range(TimeKey(time_value - TOLERANCE)..=TimeKey(time_value + TOLERANCE))
            .next()
            .map(|(_, value)| *value)
    }

    fn insert(&mut self, time_value: f64, value: f64) {
        self.entries.insert(TimeKey(time_value), value);
        if time_value > self.max_time_value {
            self.max_time_value = time_value;
        }
    }
}

/// Time-based training and forecasting engine.
///
/// The engine is owned by a concrete model, which passes itself in as the
/// [`TimeBasedForecaster`] on every call. Training needs `&mut self`;
/// forecasting works through `&self` and may run from several threads, the
/// cache being guarded by its own lock.
#[derive(Debug, Default)]
pub struct TimeBasedEngine {
    core: ForecastingCore,
    grid: Option<TimeGrid>,
    observed_values: Dataset,
    // Sorted time values of `observed_values`, index for index.
    observed_times: Vec<f64>,
    cache: RwLock<ForecastCache>,
}

impl Clone for TimeBasedEngine {
    fn clone(&self) -> Self {
        Self {
            core: self.core,
            grid: self.grid.clone(),
            observed_values: self.observed_values.clone(),
            observed_times: self.observed_times.clone(),
            cache: RwLock::new(self.cache.read().clone()),
        }
    }
}

impl TimeBasedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Train on `dataset`.
    ///
    /// On failure the engine is left untrained, even if an earlier training
    /// run had succeeded.
    pub fn train<M>(&mut self, model: &M, dataset: &Dataset) -> Result<()>
    where
        M: TimeBasedForecaster + ?Sized,
    {
        let result = self.try_train(model, dataset);
        if let Err(err) = &result {
            debug!(error = %err, "training failed");
            self.reset();
        }
        result
    }

    fn try_train<M>(&mut self, model: &M, dataset: &Dataset) -> Result<()>
    where
        M: TimeBasedForecaster + ?Sized,
    {
        self.reset();

        let time_variable = dataset.resolve_time_variable()?;
        let min_periods = model.min_periods();
        if dataset.len() < min_periods {
            return Err(ForecastError::illegal(format!(
                "need at least {} observations, got {}",
                min_periods,
                dataset.len()
            )));
        }
        if dataset.len() < 2 {
            return Err(ForecastError::illegal(
                "need at least 2 observations to establish a time step",
            ));
        }

        debug!(
            time_variable = %time_variable,
            observations = dataset.len(),
            min_periods,
            "training time-based model"
        );

        let mut observed = dataset.clone();
        observed.sort_by_variable(&time_variable);

        let times = observed
            .iter()
            .map(|point| match point.independent_value(&time_variable) {
                Some(t) if t.is_finite() => Ok(t),
                Some(t) => Err(ForecastError::illegal(format!(
                    "observation '{}' has non-finite time value {} for variable '{}'",
                    point, t, time_variable
                ))),
                None => Err(ForecastError::illegal(format!(
                    "observation '{}' has no value for time variable '{}'",
                    point, time_variable
                ))),
            })
            .collect::<Result<Vec<f64>>>()?;

        let time_step = times[1] - times[0];
        if time_step <= TOLERANCE {
            return Err(ForecastError::illegal(format!(
                "duplicate time value {} for variable '{}'",
                times[0], time_variable
            )));
        }

        for pair in times.windows(2) {
            let delta = pair[1] - pair[0];
            // A NaN difference must count as a mismatch.
            let on_grid = (time_step - delta).abs() <= TOLERANCE;
            if !on_grid {
                return Err(ForecastError::InconsistentIntervals {
                    variable: time_variable,
                    expected: time_step,
                    found: delta,
                    at: pair[1],
                });
            }
        }

        let grid = TimeGrid {
            time_variable,
            time_step,
            min_time_value: times[0],
        };
        *self.cache.get_mut() = ForecastCache {
            entries: BTreeMap::new(),
            max_time_value: times[1],
        };
        self.grid = Some(grid);
        self.observed_values = observed;
        self.observed_times = times;

        for index in 2..self.observed_times.len() {
            self.init_forecast_value(model, self.observed_times[index])?;
        }

        let holdout = self.observed_values.skip(min_periods);
        self.core.begin_evaluation();
        let forecasts = self.forecast_all(model, &holdout)?;
        let indicators =
            AccuracyIndicators::compute(&holdout, &forecasts, model.number_of_predictors())?;
        self.core.publish(indicators);

        debug!(
            time_step,
            holdout = holdout.len(),
            indicators = %indicators,
            "training complete"
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.core.reset();
        self.grid = None;
        self.observed_values = Dataset::default();
        self.observed_times.clear();
        *self.cache.get_mut() = ForecastCache::default();
    }

    /// Forecast the point's value on the trained time variable.
    pub fn forecast<M>(&self, model: &M, point: &Observation) -> Result<f64>
    where
        M: TimeBasedForecaster + ?Sized,
    {
        self.core.require_trained()?;
        let grid = self.grid()?;
        let time_value = point
            .independent_value(&grid.time_variable)
            .ok_or_else(|| {
                ForecastError::illegal(format!(
                    "'{}' has no value for time variable '{}'",
                    point, grid.time_variable
                ))
            })?;
        self.get_forecast_value(model, time_value)
    }

    /// Forecast every point of a copy of `dataset`.
    pub fn forecast_all<M>(&self, model: &M, dataset: &Dataset) -> Result<Dataset>
    where
        M: TimeBasedForecaster + ?Sized,
    {
        self.core
            .forecast_all(dataset, |point| self.forecast(model, point))
    }

    /// Cached forecast at `time_value`, computing and caching it on a miss.
    ///
    /// Non-finite time values are rejected with
    /// [`ForecastError::IllegalArgument`].
    pub fn get_forecast_value<M>(&self, model: &M, time_value: f64) -> Result<f64>
    where
        M: TimeBasedForecaster + ?Sized,
    {
        if !time_value.is_finite() {
            return Err(ForecastError::illegal(format!(
                "time value must be finite, got {}",
                time_value
            )));
        }
        let grid = self.grid()?;
        if let Some(value) = self.lookup(grid, time_value) {
            trace!(time_value, value, "forecast cache hit");
            return Ok(value);
        }
        trace!(time_value, "forecast cache miss");
        self.warm_up(model, grid, time_value)?;
        self.init_forecast_value(model, time_value)
    }

    fn lookup(&self, grid: &TimeGrid, time_value: f64) -> Option<f64> {
        let cache = self.cache.read();
        if time_value < grid.min_time_value - TOLERANCE
            || time_value > cache.max_time_value + TOLERANCE
        {
            return None;
        }
        cache.lookup(time_value)
    }

    /// Cache every earlier point that shares `time_value`'s offset on the
    /// grid, oldest first, skipping points already observed or cached.
    fn warm_up<M>(&self, model: &M, grid: &TimeGrid, time_value: f64) -> Result<()>
    where
        M: TimeBasedForecaster + ?Sized,
    {
        let steps = ((time_value - grid.min_time_value) / grid.time_step + TOLERANCE).floor();
        if steps < 1.0 {
            return Ok(());
        }
        let steps = steps as u64;
        if steps > 1 {
            trace!(time_value, steps, "filling forecast cache up to horizon");
        }

        for back in (1..=steps).rev() {
            let t = time_value - grid.time_step * (back as f64);
            if self.observed_index(t).is_some() || self.lookup(grid, t).is_some() {
                continue;
            }
            self.init_forecast_value(model, t)?;
        }
        Ok(())
    }

    /// Compute the forecast at `time_value` and add it to the cache.
    ///
    /// The lock is not held while the model computes, since the model may
    /// call back into [`get_forecast_value`](Self::get_forecast_value). If
    /// another caller cached the same point in the meantime, its value is
    /// returned and nothing is added.
    fn init_forecast_value<M>(&self, model: &M, time_value: f64) -> Result<f64>
    where
        M: TimeBasedForecaster + ?Sized,
    {
        let value = model.forecast_time(self, time_value)?;

        let mut cache = self.cache.write();
        if let Some(existing) = cache.lookup(time_value) {
            return Ok(existing);
        }
        cache.insert(time_value, value);
        Ok(value)
    }

    fn observed_index(&self, time_value: f64) -> Option<usize> {
        let index = self
            .observed_times
            .partition_point(|t| *t < time_value - TOLERANCE);
        self.observed_times
            .get(index)
            .filter(|t| (**t - time_value).abs() <= TOLERANCE)
            .map(|_| index)
    }

    /// Recorded value at `time_value`.
    ///
    /// Fails with [`ForecastError::NotFound`] when no observation sits at that
    /// time; models use this as the signal to fall back to a forecast.
    pub fn get_observed_value(&self, time_value: f64) -> Result<f64> {
        let grid = self.grid()?;
        self.observed_index(time_value)
            .and_then(|index| self.observed_values.get(index))
            .map(Observation::dependent_value)
            .ok_or_else(|| ForecastError::NotFound {
                variable: grid.time_variable.clone(),
                time_value,
            })
    }

    /// The time grid, once training has validated one.
    pub fn grid(&self) -> Result<&TimeGrid> {
        self.grid.as_ref().ok_or(ForecastError::Uninitialized)
    }

    pub fn indicator_state(&self) -> IndicatorState {
        self.core.state()
    }

    pub fn is_trained(&self) -> bool {
        self.core.is_trained()
    }

    pub fn time_variable(&self) -> Option<&str> {
        self.grid.as_ref().map(|g| g.time_variable.as_str())
    }

    pub fn time_step(&self) -> Option<f64> {
        self.grid.as_ref().map(|g| g.time_step)
    }

    pub fn min_time_value(&self) -> Option<f64> {
        self.grid.as_ref().map(|g| g.min_time_value)
    }

    /// Latest time value among observations and cached forecasts.
    pub fn max_time_value(&self) -> Option<f64> {
        self.grid
            .as_ref()
            .map(|_| self.cache.read().max_time_value)
    }

    /// Observations sorted by time.
    pub fn observed_values(&self) -> &Dataset {
        &self.observed_values
    }

    /// Snapshot of the forecast cache, sorted by time.
    pub fn forecast_values(&self) -> Dataset {
        let Some(grid) = self.grid.as_ref() else {
            return Dataset::default();
        };
        let observations = self
            .cache
            .read()
            .entries
            .iter()
            .map(|(t, value)| Observation::new(*value).with_value(&grid.time_variable, t.0))
            .collect();
        Dataset::new(
            Some(grid.time_variable.as_str()),
            self.observed_values.periods_per_year(),
            observations,
        )
    }

    /// Number of cached forecasts.
    pub fn cached_forecasts(&self) -> usize {
        self.cache.read().entries.len()
    }
}
