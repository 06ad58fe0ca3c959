//! Traits defining the model surface and the time-based strategy seam.

use crate::core::{Dataset, Observation};
use crate::error::Result;
use crate::models::TimeBasedEngine;
use crate::utils::{AccuracyIndicators, IndicatorState};

/// Common interface for all forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn ForecastingModel>`.
pub trait ForecastingModel {
    /// Train the model on a dataset, replacing any previous training.
    fn train(&mut self, dataset: &Dataset) -> Result<()>;

    /// Forecast the dependent value of a single point.
    fn forecast(&self, point: &Observation) -> Result<f64>;

    /// Forecast every point of a dataset, returning a forecast copy.
    fn forecast_all(&self, dataset: &Dataset) -> Result<Dataset>;

    /// Human-readable model type.
    fn model_type(&self) -> &str;

    fn number_of_predictors(&self) -> usize;

    /// Training state of the accuracy indicators.
    fn indicator_state(&self) -> IndicatorState;

    /// Indicators of the last training run, or the -1 sentinel when untrained.
    fn accuracy_indicators(&self) -> AccuracyIndicators {
        self.indicator_state().indicators()
    }

    fn is_trained(&self) -> bool {
        self.indicator_state().is_initialized()
    }

    fn aic(&self) -> f64 {
        self.accuracy_indicators().aic
    }

    fn bias(&self) -> f64 {
        self.accuracy_indicators().bias
    }

    fn mad(&self) -> f64 {
        self.accuracy_indicators().mad
    }

    fn mape(&self) -> f64 {
        self.accuracy_indicators().mape
    }

    fn mse(&self) -> f64 {
        self.accuracy_indicators().mse
    }

    fn sae(&self) -> f64 {
        self.accuracy_indicators().sae
    }
}

/// Model-specific half of a time-based model.
///
/// A [`TimeBasedEngine`] owns the training protocol and the forecast cache and
/// calls back into this trait whenever it needs the value at one time point.
pub trait TimeBasedForecaster {
    /// Number of observations required before a forecast is possible.
    fn min_periods(&self) -> usize;

    fn number_of_predictors(&self) -> usize;

    /// Forecast the dependent value at `time_value`.
    ///
    /// Implementations read history through `engine.get_observed_value` and
    /// `engine.get_forecast_value`; the latter may recurse back into this method.
    fn forecast_time(&self, engine: &TimeBasedEngine, time_value: f64) -> Result<f64>;
}

/// A model behind a pointer, shareable across threads once trained.
///
/// Every model in the crate is `Send + Sync`, so a trained `BoxedModel` can
/// sit in an `Arc` and answer forecasts from several threads.
///
/// # Example
///
/// ```
/// use openforecast::core::{Dataset, Observation};
/// use openforecast::models::{BoxedModel, ForecastingModel};
/// use openforecast::models::baseline::MovingAverage;
///
/// let mut model: BoxedModel = Box::new(MovingAverage::new(2));
/// model.train(&Dataset::from_values("t", 0.0, 1.0, &[4.0, 6.0, 8.0])).unwrap();
///
/// let next = model.forecast(&Observation::new(0.0).with_value("t", 3.0)).unwrap();
/// assert_eq!(next, 7.0);
/// ```
pub type BoxedModel = Box<dyn ForecastingModel + Send + Sync>;

/// Named recipe for a fresh, untrained model.
///
/// A spec is a factory rather than a model, so the same spec can be trained
/// on several datasets without the runs sharing a forecast cache.
///
/// # Example
///
/// ```
/// use openforecast::core::Dataset;
/// use openforecast::models::{ForecastingModel, ModelSpec};
/// use openforecast::models::baseline::WeightedMovingAverage;
///
/// let spec = ModelSpec::new("WMA(1,2)", || {
///     Box::new(WeightedMovingAverage::new(vec![1.0, 2.0]).unwrap())
/// });
///
/// let mut rising = spec.create();
/// rising.train(&Dataset::from_values("t", 0.0, 1.0, &[1.0, 2.0, 3.0, 4.0])).unwrap();
/// let untouched = spec.create();
///
/// assert!(rising.is_trained());
/// assert!(!untouched.is_trained());
/// ```
pub struct ModelSpec {
    /// Label reported by the registry
    pub name: &'static str,
    factory: Box<dyn Fn() -> BoxedModel + Send + Sync>,
}

impl ModelSpec {
    pub fn new<F>(name: &'static str, factory: F) -> Self
    where
        F: Fn() -> BoxedModel + Send + Sync + 'static,
    {
        Self {
            name,
            factory: Box::new(factory),
        }
    }

    /// Spec whose factory takes a window length, fixed here.
    pub fn with_period<F>(name: &'static str, factory: F, period: usize) -> Self
    where
        F: Fn(usize) -> BoxedModel + Send + Sync + 'static,
    {
        Self {
            name,
            factory: Box::new(move || factory(period)),
        }
    }

    /// Build an untrained model.
    pub fn create(&self) -> BoxedModel {
        (self.factory)()
    }
}

/// Candidate models trained side by side and compared on their hold-out
/// accuracy indicators.
///
/// # Example
///
/// ```
/// use openforecast::core::Dataset;
/// use openforecast::models::{ForecastingModel, ModelRegistry, ModelSpec};
/// use openforecast::models::baseline::MovingAverage;
///
/// let mut registry = ModelRegistry::new();
/// for (name, period) in [("MA(2)", 2), ("MA(4)", 4), ("MA(8)", 8)] {
///     registry.register(ModelSpec::with_period(name, |p| Box::new(MovingAverage::new(p)), period));
/// }
///
/// // Six points: MA(8) cannot train, the others are scored on what they held out.
/// let data = Dataset::from_values("t", 0.0, 1.0, &[5.0, 7.0, 6.0, 8.0, 7.0, 9.0]);
/// let outcomes = registry.train_all(&data);
/// assert!(outcomes[2].1.is_err());
///
/// let (best, model) = registry.best_by_mse(&data).unwrap();
/// assert_eq!(best, "MA(2)");
/// assert!(model.mse() < 2.0);
/// ```
pub struct ModelRegistry {
    models: Vec<ModelSpec>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self { models: Vec::new() }
    }

    pub fn register(&mut self, spec: ModelSpec) {
        self.models.push(spec);
    }

    /// Number of registered specs.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Registered specs, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.iter()
    }

    /// Create and train one model per spec, keeping every outcome.
    pub fn train_all(&self, dataset: &Dataset) -> Vec<(&'static str, Result<BoxedModel>)> {
        self.models
            .iter()
            .map(|spec| {
                let mut model = spec.create();
                let outcome = model.train(dataset).map(|_| model);
                (spec.name, outcome)
            })
            .collect()
    }

    /// Trained model with the lowest MSE, if any spec trained successfully.
    pub fn best_by_mse(&self, dataset: &Dataset) -> Option<(&'static str, BoxedModel)> {
        self.train_all(dataset)
            .into_iter()
            .filter_map(|(name, outcome)| outcome.ok().map(|m| (name, m)))
            .filter(|(_, m)| m.mse().is_finite())
            .min_by(|(_, a), (_, b)| a.mse().total_cmp(&b.mse()))
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
