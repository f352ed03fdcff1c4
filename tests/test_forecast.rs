use chrono::NaiveDate;
use demand_forecast::data::DailySeries;
use demand_forecast::error::{ForecastError, Result};
use demand_forecast::forecast::{DemandForecaster, ForecastConfig, ForecastMethod};
use demand_forecast::models::Predictor;
use rstest::rstest;
use std::time::Duration;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn flat_series(len: usize, value: f64) -> DailySeries {
    DailySeries::from_values(date(2024, 1, 1), vec![value; len])
}

/// Ninety days of positive demand with weekly-ish seasonality and drift,
/// enough history for the regression path
fn rich_series() -> DailySeries {
    let values = (0..90)
        .map(|i| 10.0 + 3.0 * (0.3 * i as f64).sin() + 0.05 * i as f64)
        .collect();
    DailySeries::from_values(date(2024, 1, 1), values)
}

#[derive(Debug)]
struct FailingPredictor;

impl Predictor for FailingPredictor {
    fn train(&mut self, _features: &[Vec<f64>], _targets: &[f64]) -> Result<()> {
        Err(ForecastError::PredictorFailure("boom".to_string()))
    }

    fn predict(&self, _features: &[Vec<f64>]) -> Result<Vec<f64>> {
        Err(ForecastError::PredictorFailure("boom".to_string()))
    }

    fn name(&self) -> &str {
        "Failing"
    }
}

/// Trains fine, then predicts an absurdly negative normalized value
#[derive(Debug)]
struct PessimisticPredictor;

impl Predictor for PessimisticPredictor {
    fn train(&mut self, _features: &[Vec<f64>], _targets: &[f64]) -> Result<()> {
        Ok(())
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>> {
        Ok(vec![-100.0; features.len()])
    }

    fn name(&self) -> &str {
        "Pessimistic"
    }
}

#[test]
fn test_rich_history_takes_the_regression_path() {
    let forecaster = DemandForecaster::new(ForecastConfig::recommendation());
    let outcome = forecaster.forecast(&rich_series()).unwrap();

    assert_eq!(outcome.method, ForecastMethod::Regression);
    assert_eq!(outcome.values.len(), 14);
    assert!(outcome.values.iter().all(|v| *v >= 0.0 && v.is_finite()));
    assert!(outcome.backtest_mae.is_some());
    assert!(outcome.backtest_mae.unwrap() >= 0.0);
    assert_eq!(outcome.train_samples, 90 - 14 - 7);
}

#[test]
fn test_forecast_is_deterministic_for_a_fixed_seed() {
    let config = ForecastConfig::recommendation().with_seed(7);
    let first = DemandForecaster::new(config.clone()).forecast(&rich_series()).unwrap();
    let second = DemandForecaster::new(config).forecast(&rich_series()).unwrap();

    assert_eq!(first.values, second.values);
    assert_eq!(first.backtest_mae, second.backtest_mae);
}

#[test]
fn test_short_history_falls_back_to_average() {
    // 30 identical values of 4, lookback 7, horizon 14: too few samples
    // for the backtest split, so the average method must kick in
    let config = ForecastConfig::recommendation()
        .with_lookback(7)
        .with_horizon(14);
    let forecaster = DemandForecaster::new(config);

    let outcome = forecaster.forecast(&flat_series(30, 4.0)).unwrap();

    assert_eq!(outcome.method, ForecastMethod::Average);
    assert_eq!(outcome.values.len(), 14);
    assert!(outcome.values.iter().all(|v| *v == 4.0));
    assert_eq!(outcome.forecast_total(), 56.0);
    assert!(outcome.backtest_mae.is_none());
}

#[test]
fn test_fallback_never_fails_below_lookback() {
    let forecaster = DemandForecaster::new(ForecastConfig::recommendation());

    for len in 0..15 {
        let outcome = forecaster.forecast(&flat_series(len, 2.0)).unwrap();
        assert_eq!(outcome.method, ForecastMethod::Average);
    }
}

#[test]
fn test_empty_series_forecasts_zero_demand() {
    let forecaster = DemandForecaster::new(ForecastConfig::recommendation());
    let outcome = forecaster
        .forecast(&DailySeries::from_values(date(2024, 1, 1), vec![]))
        .unwrap();

    assert_eq!(outcome.method, ForecastMethod::Average);
    assert_eq!(outcome.forecast_total(), 0.0);
}

#[test]
fn test_predictor_failure_degrades_to_average() {
    let forecaster = DemandForecaster::new(ForecastConfig::recommendation());

    let outcome = forecaster
        .forecast_with(&rich_series(), &mut FailingPredictor)
        .unwrap();

    assert_eq!(outcome.method, ForecastMethod::Average);
}

#[test]
fn test_forecasts_are_clipped_at_zero() {
    let forecaster = DemandForecaster::new(ForecastConfig::recommendation());

    let outcome = forecaster
        .forecast_with(&rich_series(), &mut PessimisticPredictor)
        .unwrap();

    assert_eq!(outcome.method, ForecastMethod::Regression);
    assert!(outcome.values.iter().all(|v| *v == 0.0));
}

#[test]
fn test_exhausted_time_budget_forces_the_fallback() {
    let config = ForecastConfig::recommendation().with_time_budget(Duration::ZERO);
    let forecaster = DemandForecaster::new(config);

    let outcome = forecaster.forecast(&rich_series()).unwrap();
    assert_eq!(outcome.method, ForecastMethod::Average);
}

#[test]
fn test_trend_forecast_aligns_history_and_horizon() {
    let forecaster = DemandForecaster::new(ForecastConfig::recommendation());
    let series = rich_series();

    let result = forecaster.trend_forecast(&series).unwrap();

    assert_eq!(result.labels.len(), 90 + 14);
    assert_eq!(result.actual.len(), result.labels.len());
    assert_eq!(result.forecast.len(), result.labels.len());

    assert!(result.actual[..90].iter().all(|v| v.is_some()));
    assert!(result.actual[90..].iter().all(|v| v.is_none()));
    assert!(result.forecast[..90].iter().all(|v| v.is_none()));
    assert!(result.forecast[90..].iter().all(|v| v.is_some()));

    // Labels stay strictly consecutive across the history/horizon seam
    for pair in result.labels.windows(2) {
        assert_eq!((pair[1] - pair[0]).num_days(), 1);
    }

    assert_eq!(result.metadata.lookback, 14);
    assert_eq!(result.metadata.horizon, 14);
    assert_eq!(result.metadata.backtest_window, 7);
    assert!(result.backtest_error.is_some());
}

#[test]
fn test_trend_forecast_of_empty_series_is_an_error() {
    let forecaster = DemandForecaster::new(ForecastConfig::recommendation());
    let err = forecaster
        .trend_forecast(&DailySeries::from_values(date(2024, 1, 1), vec![]))
        .unwrap_err();

    assert!(matches!(err, ForecastError::DataError(_)));
}

#[rstest]
#[case(1, 3)]
#[case(3, 3)]
#[case(30, 30)]
#[case(100, 60)]
fn test_lookback_is_clamped(#[case] requested: usize, #[case] expected: usize) {
    let config = ForecastConfig::recommendation().with_lookback(requested);
    assert_eq!(config.lookback(), expected);
}

#[rstest]
#[case(1, 7)]
#[case(30, 30)]
#[case(90, 60)]
fn test_recommendation_horizon_is_clamped(#[case] requested: usize, #[case] expected: usize) {
    let config = ForecastConfig::recommendation().with_horizon(requested);
    assert_eq!(config.horizon(), expected);
}

#[rstest]
#[case(1, 1)]
#[case(90, 90)]
#[case(120, 90)]
fn test_trend_horizon_is_clamped(#[case] requested: usize, #[case] expected: usize) {
    let config = ForecastConfig::trend().with_horizon(requested);
    assert_eq!(config.horizon(), expected);
}

#[rstest]
#[case(10, 30)]
#[case(120, 120)]
#[case(500, 365)]
fn test_history_days_are_clamped(#[case] requested: usize, #[case] expected: usize) {
    let config = ForecastConfig::recommendation().with_history_days(requested);
    assert_eq!(config.history_days(), expected);
}

#[test]
fn test_window_ending_spans_the_history_days() {
    let config = ForecastConfig::recommendation().with_history_days(120);
    let (start, end) = config.window_ending(date(2024, 6, 30));

    assert_eq!(end, date(2024, 6, 30));
    assert_eq!((end - start).num_days(), 119);
}

#[test]
fn test_trend_preset_uses_three_years_of_history() {
    let config = ForecastConfig::trend();
    assert_eq!(config.history_days(), 1095);
}
