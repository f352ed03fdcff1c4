//! The forecasting pipeline: configuration, orchestration, recursive
//! multi-step forecasting, and the average-based fallback

use crate::backtest::backtest;
use crate::data::DailySeries;
use crate::error::{ForecastError, Result};
use crate::features::FeatureBuilder;
use crate::models::{BaggedRidge, Predictor};
use crate::normalize::{normalize, NormalizationParams};
use crate::recommend::{InventoryRecommendation, ReorderPolicy, StockSnapshot};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// Fixed history window for trend forecasts, in days
pub const TREND_HISTORY_DAYS: usize = 1095;

const HISTORY_DAYS_BOUNDS: (usize, usize) = (30, 365);
const LOOKBACK_BOUNDS: (usize, usize) = (3, 60);
const BACKTEST_BOUNDS: (usize, usize) = (7, 60);
const RECOMMENDATION_HORIZON_BOUNDS: (usize, usize) = (7, 60);
const TREND_HORIZON_BOUNDS: (usize, usize) = (1, 90);

/// How a forecast was produced, so consumers can tell full-fidelity
/// regression output from the degraded average-based fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMethod {
    /// Lag-feature regression with recursive roll-forward
    Regression,
    /// Flat forecast at the historical mean
    Average,
}

impl std::fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastMethod::Regression => write!(f, "regression"),
            ForecastMethod::Average => write!(f, "average"),
        }
    }
}

/// Pipeline configuration. Setters clamp to the recognized ranges
/// instead of erroring, so any caller-supplied value yields a runnable
/// configuration.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    history_days: usize,
    horizon: usize,
    horizon_bounds: (usize, usize),
    lookback: usize,
    backtest_days: usize,
    use_calendar: bool,
    seed: u64,
    time_budget: Option<std::time::Duration>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self::recommendation()
    }
}

impl ForecastConfig {
    /// Preset for reorder recommendations: 120 days of history, a
    /// 14-day horizon clamped to `[7, 60]`
    pub fn recommendation() -> Self {
        Self {
            history_days: 120,
            horizon: 14,
            horizon_bounds: RECOMMENDATION_HORIZON_BOUNDS,
            lookback: 14,
            backtest_days: 7,
            use_calendar: true,
            seed: 42,
            time_budget: None,
        }
    }

    /// Preset for trend series: a fixed three-year history, a 30-day
    /// horizon clamped to `[1, 90]`
    pub fn trend() -> Self {
        Self {
            history_days: TREND_HISTORY_DAYS,
            horizon: 30,
            horizon_bounds: TREND_HORIZON_BOUNDS,
            ..Self::recommendation()
        }
    }

    /// Set the history window length, clamped to `[30, 365]`
    pub fn with_history_days(mut self, days: usize) -> Self {
        self.history_days = days.clamp(HISTORY_DAYS_BOUNDS.0, HISTORY_DAYS_BOUNDS.1);
        self
    }

    /// Set the forecast horizon, clamped to this preset's bounds
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon.clamp(self.horizon_bounds.0, self.horizon_bounds.1);
        self
    }

    /// Set the lag window length, clamped to `[3, 60]`
    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback.clamp(LOOKBACK_BOUNDS.0, LOOKBACK_BOUNDS.1);
        self
    }

    /// Set the backtest holdout size, clamped to `[7, 60]`
    pub fn with_backtest_days(mut self, days: usize) -> Self {
        self.backtest_days = days.clamp(BACKTEST_BOUNDS.0, BACKTEST_BOUNDS.1);
        self
    }

    /// Enable or disable calendar features
    pub fn with_calendar(mut self, use_calendar: bool) -> Self {
        self.use_calendar = use_calendar;
        self
    }

    /// Set the predictor seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Cap the wall-clock time spent on one product. An exceeded budget
    /// is treated like a predictor failure and resolved by the fallback.
    pub fn with_time_budget(mut self, budget: std::time::Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// History window length in days
    pub fn history_days(&self) -> usize {
        self.history_days
    }

    /// Forecast horizon in days
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Lag window length
    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Backtest holdout size
    pub fn backtest_days(&self) -> usize {
        self.backtest_days
    }

    /// Whether calendar features are used
    pub fn use_calendar(&self) -> bool {
        self.use_calendar
    }

    /// Predictor seed
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The `[start, end]` history window ending at `end`
    pub fn window_ending(&self, end: NaiveDate) -> (NaiveDate, NaiveDate) {
        (end - Duration::days(self.history_days as i64 - 1), end)
    }

    /// Minimum lagged-sample count below which regression is not attempted
    pub fn min_regression_samples(&self) -> usize {
        10.max(2 * self.lookback)
    }
}

/// Forecast for one product over the configured horizon
#[derive(Debug, Clone, Serialize)]
pub struct ForecastOutcome {
    /// One predicted value per future day, never negative
    pub values: Vec<f64>,
    /// How the forecast was produced
    pub method: ForecastMethod,
    /// Backtest MAE in original units; absent for the fallback
    pub backtest_mae: Option<f64>,
    /// Samples the predictor was trained on; 0 for the fallback
    pub train_samples: usize,
}

impl ForecastOutcome {
    /// Total demand expected over the horizon
    pub fn forecast_total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Shape metadata echoed back with a trend forecast
#[derive(Debug, Clone, Serialize)]
pub struct ForecastMetadata {
    pub train_sample_count: usize,
    pub lookback: usize,
    pub horizon: usize,
    pub backtest_window: usize,
}

/// History plus horizon, aligned on one label axis: `actual` holds values
/// for history rows and `None` for the horizon, `forecast` the reverse
#[derive(Debug, Clone, Serialize)]
pub struct ForecastResult {
    pub labels: Vec<NaiveDate>,
    pub actual: Vec<Option<f64>>,
    pub forecast: Vec<Option<f64>>,
    pub backtest_error: Option<f64>,
    pub metadata: ForecastMetadata,
}

/// Per-product demand forecaster.
///
/// Stateless between calls: each invocation builds everything it needs
/// from the series it is given and discards it afterwards, so products
/// can be forecast in parallel with no shared state.
#[derive(Debug, Clone)]
pub struct DemandForecaster {
    config: ForecastConfig,
}

impl DemandForecaster {
    /// Create a forecaster with the given configuration
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast with the default seeded ensemble predictor.
    ///
    /// Always produces a forecast for any series: when regression is
    /// infeasible or the predictor fails, the result degrades to the
    /// average method instead of erroring. Only a series-shape contract
    /// violation surfaces.
    pub fn forecast(&self, series: &DailySeries) -> Result<ForecastOutcome> {
        let mut predictor = BaggedRidge::with_seed(self.config.seed);
        self.forecast_with(series, &mut predictor)
    }

    /// Forecast with a caller-supplied predictor
    pub fn forecast_with(
        &self,
        series: &DailySeries,
        predictor: &mut dyn Predictor,
    ) -> Result<ForecastOutcome> {
        match self.regression_forecast(series, predictor) {
            Ok(outcome) => Ok(outcome),
            Err(err) if err.degrades_to_fallback() => {
                if matches!(err, ForecastError::PredictorFailure(_)) {
                    warn!(error = %err, "predictor failed, falling back to average forecast");
                } else {
                    debug!(error = %err, "falling back to average forecast");
                }
                Ok(self.average_forecast(series))
            }
            Err(err) => Err(err),
        }
    }

    /// Full history-plus-horizon view with aligned labels, for trend charts
    pub fn trend_forecast(&self, series: &DailySeries) -> Result<ForecastResult> {
        let last_date = series.last_date().ok_or_else(|| {
            ForecastError::DataError("cannot build a trend for an empty series".to_string())
        })?;

        let outcome = self.forecast(series)?;
        let horizon = outcome.values.len();

        let mut labels = series.dates().to_vec();
        labels.extend((1..=horizon as i64).map(|offset| last_date + Duration::days(offset)));

        let mut actual: Vec<Option<f64>> = series.values().iter().copied().map(Some).collect();
        actual.extend(std::iter::repeat(None).take(horizon));

        let mut forecast: Vec<Option<f64>> = vec![None; series.len()];
        forecast.extend(outcome.values.iter().copied().map(Some));

        Ok(ForecastResult {
            labels,
            actual,
            forecast,
            backtest_error: outcome.backtest_mae,
            metadata: ForecastMetadata {
                train_sample_count: outcome.train_samples,
                lookback: self.config.lookback,
                horizon,
                backtest_window: self.config.backtest_days,
            },
        })
    }

    /// Forecast and turn the result into a reorder recommendation
    pub fn recommend(
        &self,
        series: &DailySeries,
        snapshot: StockSnapshot,
        policy: &ReorderPolicy,
    ) -> Result<InventoryRecommendation> {
        let outcome = self.forecast(series)?;
        Ok(policy.recommend(
            snapshot,
            outcome.forecast_total(),
            series.std_dev(),
            outcome.method,
        ))
    }

    fn regression_forecast(
        &self,
        series: &DailySeries,
        predictor: &mut dyn Predictor,
    ) -> Result<ForecastOutcome> {
        let started = Instant::now();
        let horizon = self.config.horizon;

        let (normalized, params) = normalize(series.values());
        let builder =
            FeatureBuilder::new(self.config.lookback)?.with_calendar(self.config.use_calendar);

        // The trend term is anchored to history + horizon so training rows
        // and future rows share one scale
        let total = series.len() + horizon;
        let (features, targets) = builder.build_dataset(series, &normalized, total)?;

        let min_samples = self.config.min_regression_samples();
        if targets.len() < min_samples {
            return Err(ForecastError::InsufficientData {
                required: min_samples,
                actual: targets.len(),
            });
        }

        let report = backtest(
            predictor,
            &features,
            &targets,
            self.config.backtest_days,
            &params,
        )?;
        self.check_budget(started)?;

        let window = builder.latest_window(&normalized)?;
        let values = self.roll_forward(predictor, window, series, &params, &builder, started)?;

        Ok(ForecastOutcome {
            values,
            method: ForecastMethod::Regression,
            backtest_mae: Some(report.mae),
            train_samples: report.train_samples,
        })
    }

    /// Autoregressive multi-step forecast: each prediction is clipped at
    /// zero, emitted, re-normalized and fed back into the lag window.
    /// Error compounds with horizon length; no correction is applied
    /// beyond the non-negativity clip.
    fn roll_forward(
        &self,
        predictor: &dyn Predictor,
        mut window: Vec<f64>,
        series: &DailySeries,
        params: &NormalizationParams,
        builder: &FeatureBuilder,
        started: Instant,
    ) -> Result<Vec<f64>> {
        let last_date = series.last_date().ok_or(ForecastError::InsufficientData {
            required: 1,
            actual: 0,
        })?;

        let horizon = self.config.horizon;
        let history_len = series.len();
        let total = history_len + horizon;
        let mut values = Vec::with_capacity(horizon);

        for step in 0..horizon {
            self.check_budget(started)?;

            let date = last_date + Duration::days(step as i64 + 1);
            let row = builder.feature_row(&window, date, history_len + step, total);

            let batch = predictor.predict(std::slice::from_ref(&row))?;
            let predicted = batch.first().copied().ok_or_else(|| {
                ForecastError::PredictorFailure("predictor returned an empty batch".to_string())
            })?;
            if !predicted.is_finite() {
                return Err(ForecastError::PredictorFailure(
                    "predictor returned a non-finite value".to_string(),
                ));
            }

            // Demand cannot be negative
            let value = params.inverse_one(predicted).max(0.0);
            values.push(value);

            window.remove(0);
            window.push(params.transform_one(value));
        }

        Ok(values)
    }

    /// Guaranteed terminal case: a flat forecast at the series mean
    fn average_forecast(&self, series: &DailySeries) -> ForecastOutcome {
        let mean = series.mean().max(0.0);
        ForecastOutcome {
            values: vec![mean; self.config.horizon],
            method: ForecastMethod::Average,
            backtest_mae: None,
            train_samples: 0,
        }
    }

    fn check_budget(&self, started: Instant) -> Result<()> {
        match self.config.time_budget {
            Some(budget) if started.elapsed() > budget => Err(ForecastError::PredictorFailure(
                "per-product time budget exceeded".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
