//! Accuracy indicators for forecast evaluation.

use crate::core::Dataset;
use crate::error::{ForecastError, Result};
use std::f64::consts::TAU;
use std::fmt;
use tracing::warn;

/// Summary statistics of a forecast-vs-actual comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyIndicators {
    /// Akaike Information Criterion
    pub aic: f64,
    /// Mean error (forecast - actual)
    pub bias: f64,
    /// Mean Absolute Deviation
    pub mad: f64,
    /// Mean Absolute Percentage Error, as a fraction
    pub mape: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Sum of Absolute Errors
    pub sae: f64,
}

impl AccuracyIndicators {
    /// Sentinel reported by a model that was never trained: every field is -1.
    pub fn uninitialized() -> Self {
        Self::filled(-1.0)
    }

    fn filled(value: f64) -> Self {
        Self {
            aic: value,
            bias: value,
            mad: value,
            mape: value,
            mse: value,
            sae: value,
        }
    }

    /// Compare `forecast` against `actual` point by point.
    ///
    /// A zero actual value makes MAPE non-finite; the value is reported as is.
    pub fn compute(actual: &Dataset, forecast: &Dataset, num_predictors: usize) -> Result<Self> {
        calculate_indicators(
            &actual.dependent_values(),
            &forecast.dependent_values(),
            num_predictors,
        )
    }
}

/// Placeholder for "trained, indicators not yet computed": every field is `f64::MAX`.
impl Default for AccuracyIndicators {
    fn default() -> Self {
        Self::filled(f64::MAX)
    }
}

impl fmt::Display for AccuracyIndicators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AIC={:.6}, Bias={:.6}, MAD={:.6}, MAPE={:.6}, MSE={:.6}, SAE={:.6}",
            self.aic, self.bias, self.mad, self.mape, self.mse, self.sae
        )
    }
}

/// Training state of a model's indicators.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum IndicatorState {
    /// The model was never trained.
    #[default]
    Uninitialized,
    /// Training is past validation; indicators are still being computed.
    Default,
    /// Indicators from the last successful training run.
    Computed(AccuracyIndicators),
}

impl IndicatorState {
    /// True once training has moved past the uninitialized state.
    pub fn is_initialized(&self) -> bool {
        !matches!(self, IndicatorState::Uninitialized)
    }

    /// Indicator values with the sentinel semantics of each state.
    pub fn indicators(&self) -> AccuracyIndicators {
        match self {
            IndicatorState::Uninitialized => AccuracyIndicators::uninitialized(),
            IndicatorState::Default => AccuracyIndicators::default(),
            IndicatorState::Computed(indicators) => *indicators,
        }
    }
}

/// Calculate accuracy indicators from paired actual and forecast values.
///
/// # Arguments
/// * `actual` - Recorded values
/// * `forecast` - Forecast values for the same points
/// * `num_predictors` - Number of predictors used by the model (AIC penalty)
pub fn calculate_indicators(
    actual: &[f64],
    forecast: &[f64],
    num_predictors: usize,
) -> Result<AccuracyIndicators> {
    if actual.len() != forecast.len() {
        return Err(ForecastError::illegal(format!(
            "cannot compare {} actual values against {} forecast values",
            actual.len(),
            forecast.len()
        )));
    }
    if actual.is_empty() {
        return Err(ForecastError::illegal(
            "cannot compute accuracy indicators from an empty comparison",
        ));
    }

    let mut sum_err = 0.0;
    let mut sum_abs_err = 0.0;
    let mut sum_abs_percent_err = 0.0;
    let mut sum_sq_err = 0.0;

    for (a, f) in actual.iter().zip(forecast.iter()) {
        let delta = f - a;
        sum_err += delta;
        sum_abs_err += delta.abs();
        sum_abs_percent_err += (delta / a).abs();
        sum_sq_err += delta * delta;
    }

    let n = actual.len() as f64;
    let p = num_predictors as f64;

    let mape = sum_abs_percent_err / n;
    if !mape.is_finite() {
        warn!(mape, "MAPE is not finite; an actual value is zero");
    }

    Ok(AccuracyIndicators {
        aic: n * TAU.ln() + (sum_sq_err / n).ln() + 2.0 * (p + 2.0),
        bias: sum_err / n,
        mad: sum_abs_err / n,
        mape,
        mse: sum_sq_err / n,
        sae: sum_abs_err,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tracing_test::traced_test;

    #[test]
    fn known_values() {
        let actual = vec![10.0, 10.0, 10.0];
        let forecast = vec![11.0, 9.0, 10.0];

        let ind = calculate_indicators(&actual, &forecast, 1).unwrap();

        assert_relative_eq!(ind.bias, 0.0, epsilon = 1e-10);
        assert_relative_eq!(ind.mad, 2.0 / 3.0, epsilon = 1e-10);
        assert_relative_eq!(ind.mse, 2.0 / 3.0, epsilon = 1e-10);
        assert_relative_eq!(ind.sae, 2.0, epsilon = 1e-10);
        assert_relative_eq!(ind.mape, 0.2 / 3.0, epsilon = 1e-10);

        let expected_aic = 3.0 * TAU.ln() + (2.0_f64 / 3.0).ln() + 6.0;
        assert_relative_eq!(ind.aic, expected_aic, epsilon = 1e-10);
    }

    #[test]
    fn bias_is_signed() {
        let ind = calculate_indicators(&[1.0, 2.0], &[2.0, 3.0], 1).unwrap();
        assert_relative_eq!(ind.bias, 1.0, epsilon = 1e-10);

        let ind = calculate_indicators(&[1.0, 2.0], &[0.0, 1.0], 1).unwrap();
        assert_relative_eq!(ind.bias, -1.0, epsilon = 1e-10);
    }

    #[test]
    fn length_mismatch() {
        let result = calculate_indicators(&[1.0, 2.0, 3.0], &[1.0, 2.0], 1);
        assert!(matches!(result, Err(ForecastError::IllegalArgument(_))));
    }

    #[test]
    fn empty_comparison() {
        let result = calculate_indicators(&[], &[], 1);
        assert!(matches!(result, Err(ForecastError::IllegalArgument(_))));
    }

    #[test]
    #[traced_test]
    fn zero_actual_gives_non_finite_mape() {
        let ind = calculate_indicators(&[0.0, 1.0], &[1.0, 1.0], 1).unwrap();
        assert!(!ind.mape.is_finite());
        assert!(ind.mad.is_finite());
        assert!(logs_contain("MAPE is not finite"));
    }

    #[test]
    #[traced_test]
    fn finite_mape_logs_no_warning() {
        let ind = calculate_indicators(&[2.0, 4.0], &[1.0, 5.0], 1).unwrap();
        assert_relative_eq!(ind.mape, 0.375, epsilon = 1e-10);
        assert!(!logs_contain("MAPE is not finite"));
    }

    #[test]
    fn perfect_forecast_has_zero_error() {
        let ind = calculate_indicators(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], 1).unwrap();
        assert_relative_eq!(ind.mse, 0.0, epsilon = 1e-10);
        assert_relative_eq!(ind.sae, 0.0, epsilon = 1e-10);
        assert_eq!(ind.aic, f64::NEG_INFINITY);
    }

    #[test]
    fn compute_reads_dependent_values() {
        let actual = Dataset::from_values("t", 0.0, 1.0, &[10.0, 10.0, 10.0]);
        let forecast = Dataset::from_values("t", 0.0, 1.0, &[11.0, 9.0, 10.0]);

        let ind = AccuracyIndicators::compute(&actual, &forecast, 1).unwrap();
        assert_relative_eq!(ind.sae, 2.0, epsilon = 1e-10);
    }

    #[test]
    fn sentinel_states() {
        assert_eq!(AccuracyIndicators::uninitialized().aic, -1.0);
        assert_eq!(AccuracyIndicators::default().sae, f64::MAX);

        let state = IndicatorState::default();
        assert!(!state.is_initialized());
        assert_eq!(state.indicators(), AccuracyIndicators::uninitialized());

        assert!(IndicatorState::Default.is_initialized());
        assert_eq!(
            IndicatorState::Default.indicators(),
            AccuracyIndicators::default()
        );
    }

    #[test]
    fn display_lists_all_six() {
        let ind = calculate_indicators(&[10.0, 10.0, 10.0], &[11.0, 9.0, 10.0], 1).unwrap();
        let text = ind.to_string();
        assert!(text.contains("Bias=0.000000"));
        assert!(text.contains("SAE=2.000000"));
        assert!(text.starts_with("AIC="));
    }
}
