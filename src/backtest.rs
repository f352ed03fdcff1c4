//! Backtesting: temporal holdout evaluation of a predictor

use crate::error::{ForecastError, Result};
use crate::models::Predictor;
use crate::normalize::NormalizationParams;

/// Minimum number of samples the training side of the split must keep
pub const MIN_TRAIN_SAMPLES: usize = 20;

/// Outcome of a backtest run
#[derive(Debug, Clone)]
pub struct BacktestReport {
    /// Mean absolute error on the held-out tail, in original units
    pub mae: f64,
    /// Number of samples the predictor was trained on
    pub train_samples: usize,
    /// Number of held-out samples the error was measured on
    pub holdout: usize,
}

/// Train on the oldest samples, measure error on the newest.
///
/// The split is by index, never random: the first `n − holdout` samples
/// train the predictor, the last `holdout` are scored. Shuffling would
/// leak future information into training. The predictor is left trained
/// on the head split so it can be rolled forward afterwards.
pub fn backtest(
    predictor: &mut dyn Predictor,
    features: &[Vec<f64>],
    targets: &[f64],
    holdout: usize,
    params: &NormalizationParams,
) -> Result<BacktestReport> {
    if features.len() != targets.len() {
        return Err(ForecastError::InvalidSeriesShape(format!(
            "feature rows ({}) don't match targets ({})",
            features.len(),
            targets.len()
        )));
    }
    if holdout == 0 {
        return Err(ForecastError::InvalidParameter(
            "Holdout must be positive".to_string(),
        ));
    }

    let n = targets.len();
    let required = MIN_TRAIN_SAMPLES + holdout;
    if n < required {
        return Err(ForecastError::InsufficientSamples {
            required,
            actual: n,
        });
    }

    let split = n - holdout;
    predictor.train(&features[..split], &targets[..split])?;

    let predictions = predictor.predict(&features[split..])?;
    if predictions.len() != holdout {
        return Err(ForecastError::PredictorFailure(format!(
            "predictor returned {} values for {} rows",
            predictions.len(),
            holdout
        )));
    }
    if predictions.iter().any(|p| !p.is_finite()) {
        return Err(ForecastError::PredictorFailure(
            "predictor returned non-finite values".to_string(),
        ));
    }

    let mae = mean_absolute_error(
        &params.inverse(&predictions),
        &params.inverse(&targets[split..]),
    )?;

    Ok(BacktestReport {
        mae,
        train_samples: split,
        holdout,
    })
}

/// Mean absolute difference between forecast and actual values
pub fn mean_absolute_error(forecast: &[f64], actual: &[f64]) -> Result<f64> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::InvalidSeriesShape(
            "forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let sum: f64 = forecast
        .iter()
        .zip(actual.iter())
        .map(|(f, a)| (f - a).abs())
        .sum();

    Ok(sum / forecast.len() as f64)
}
