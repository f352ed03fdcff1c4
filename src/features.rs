//! Lagged feature construction for supervised forecasting

use crate::data::DailySeries;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};

/// Number of calendar-derived features appended to each lag window
pub const CALENDAR_FEATURE_COUNT: usize = 3;

/// Builds (lag window [+ calendar features]) → next value samples.
///
/// The column layout is a strict contract shared by training and
/// prediction: `lookback` lags oldest to newest, then day-of-week,
/// month, and position-in-series trend, each scaled to `[0, 1]`. The
/// predictor is never told which column is which, so the layout must
/// never differ between the two call sites.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    lookback: usize,
    calendar: bool,
}

impl FeatureBuilder {
    /// Create a feature builder with the given lag window length
    pub fn new(lookback: usize) -> Result<Self> {
        if lookback == 0 {
            return Err(ForecastError::InvalidParameter(
                "Lookback must be positive".to_string(),
            ));
        }

        Ok(Self {
            lookback,
            calendar: true,
        })
    }

    /// Enable or disable calendar features
    pub fn with_calendar(mut self, calendar: bool) -> Self {
        self.calendar = calendar;
        self
    }

    /// Lag window length
    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Width of every feature row produced by this builder
    pub fn feature_width(&self) -> usize {
        if self.calendar {
            self.lookback + CALENDAR_FEATURE_COUNT
        } else {
            self.lookback
        }
    }

    /// Calendar-derived features for one date: day-of-week, month, and a
    /// position-in-series trend term, each scaled to `[0, 1]`
    pub fn calendar_terms(date: NaiveDate, position: usize, total: usize) -> [f64; 3] {
        let day_of_week = date.weekday().num_days_from_monday() as f64 / 6.0;
        let month = (date.month() as f64 - 1.0) / 11.0;
        let trend = if total > 0 {
            position as f64 / total as f64
        } else {
            0.0
        };

        [day_of_week, month, trend]
    }

    /// Build one feature row from a lag window and the date it predicts.
    ///
    /// `position` / `total` anchor the trend term; callers must keep the
    /// same `total` across a run so training and future rows share a scale.
    pub fn feature_row(
        &self,
        window: &[f64],
        date: NaiveDate,
        position: usize,
        total: usize,
    ) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.feature_width());
        row.extend_from_slice(window);
        if self.calendar {
            row.extend_from_slice(&Self::calendar_terms(date, position, total));
        }
        row
    }

    /// Turn a normalized series into a supervised dataset.
    ///
    /// For each index `t` from `lookback` to `N − 1`, the feature vector is
    /// the `lookback` preceding normalized values (plus calendar features
    /// for the predicted date) and the label is `normalized[t]`. Samples
    /// come out in chronological order; callers must not shuffle them.
    pub fn build_dataset(
        &self,
        series: &DailySeries,
        normalized: &[f64],
        total: usize,
    ) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
        if normalized.len() != series.len() {
            return Err(ForecastError::InvalidSeriesShape(format!(
                "normalized length ({}) doesn't match series length ({})",
                normalized.len(),
                series.len()
            )));
        }

        let n = normalized.len();
        if n <= self.lookback {
            return Err(ForecastError::InsufficientData {
                required: self.lookback + 1,
                actual: n,
            });
        }

        let mut features = Vec::with_capacity(n - self.lookback);
        let mut targets = Vec::with_capacity(n - self.lookback);

        for t in self.lookback..n {
            let window = &normalized[t - self.lookback..t];
            features.push(self.feature_row(window, series.dates()[t], t, total));
            targets.push(normalized[t]);
        }

        Ok((features, targets))
    }

    /// The most recent lag window of a normalized series, ready to seed
    /// the recursive forecaster
    pub fn latest_window(&self, normalized: &[f64]) -> Result<Vec<f64>> {
        if normalized.len() < self.lookback {
            return Err(ForecastError::InsufficientData {
                required: self.lookback,
                actual: normalized.len(),
            });
        }

        Ok(normalized[normalized.len() - self.lookback..].to_vec())
    }
}
