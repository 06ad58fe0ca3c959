//! Error types for the openforecast library.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while training or querying a model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// The operation needs a trained model.
    #[error("model must be trained before forecasting")]
    Uninitialized,

    /// Malformed input: ambiguous or missing time variable, a dataset that is
    /// too short, a query point without a time value, mismatched lengths.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// No observation exists at the requested time value.
    #[error("no observed value for '{variable}' at {time_value}")]
    NotFound { variable: String, time_value: f64 },

    /// The training data is not on a regular time grid.
    #[error(
        "inconsistent intervals found in time series, using variable '{variable}': \
         expected step {expected}, found {found} at {at}"
    )]
    InconsistentIntervals {
        variable: String,
        expected: f64,
        found: f64,
        at: f64,
    },

    /// A single point of a batch forecast failed.
    #[error("forecast failed at {point}")]
    PointForecast {
        point: String,
        #[source]
        source: Box<ForecastError>,
    },
}

/// Root classification of a [`ForecastError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Uninitialized,
    IllegalArgument,
    NotFound,
    InconsistentIntervals,
}

impl ForecastError {
    /// Kind of the underlying failure, looking through per-point wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::Uninitialized => ErrorKind::Uninitialized,
            ForecastError::IllegalArgument(_) => ErrorKind::IllegalArgument,
            ForecastError::NotFound { .. } => ErrorKind::NotFound,
            ForecastError::InconsistentIntervals { .. } => ErrorKind::InconsistentIntervals,
            ForecastError::PointForecast { source, .. } => source.kind(),
        }
    }

    pub(crate) fn illegal(msg: impl Into<String>) -> Self {
        ForecastError::IllegalArgument(msg.into())
    }
}
