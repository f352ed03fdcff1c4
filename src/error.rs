//! Error types for the demand_forecast crate

use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Too few observations to build a lagged dataset
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Too few samples left on the training side of the backtest split
    #[error("Insufficient samples: need at least {required} samples, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    /// The regression capability raised or returned malformed output
    #[error("Predictor failure: {0}")]
    PredictorFailure(String),

    /// Labels and values of a series do not line up
    #[error("Invalid series shape: {0}")]
    InvalidSeriesShape(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl ForecastError {
    /// Whether the forecasting pipeline resolves this error through the
    /// average-based fallback instead of surfacing it to the caller.
    pub fn degrades_to_fallback(&self) -> bool {
        matches!(
            self,
            ForecastError::InsufficientData { .. }
                | ForecastError::InsufficientSamples { .. }
                | ForecastError::PredictorFailure(_)
        )
    }
}

impl From<polars::prelude::PolarsError> for ForecastError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
