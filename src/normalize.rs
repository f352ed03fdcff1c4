//! Z-score normalization, reversible per forecasting run

use serde::{Deserialize, Serialize};

/// Mean and standard deviation fitted over one series.
///
/// Owned by a single forecasting run; never shared across products.
/// `std` is floored to 1.0 when the series has fewer than two points or
/// zero variance, so both directions are always defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    /// Mean of the fitted series (0.0 for an empty series)
    pub mean: f64,
    /// Population standard deviation, floored to a strictly positive value
    pub std: f64,
}

impl NormalizationParams {
    /// Fit parameters over a series
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self { mean: 0.0, std: 1.0 };
        }

        let mean = values.iter().sum::<f64>() / values.len() as f64;

        let std = if values.len() < 2 {
            1.0
        } else {
            let variance = values
                .iter()
                .map(|value| (value - mean).powi(2))
                .sum::<f64>()
                / values.len() as f64;
            let std = variance.sqrt();
            if std > 0.0 {
                std
            } else {
                1.0
            }
        };

        Self { mean, std }
    }

    /// Standardize one value
    pub fn transform_one(&self, x: f64) -> f64 {
        (x - self.mean) / self.std
    }

    /// Undo standardization for one value
    pub fn inverse_one(&self, z: f64) -> f64 {
        z * self.std + self.mean
    }

    /// Standardize a slice of values
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&x| self.transform_one(x)).collect()
    }

    /// Undo standardization for a slice of values
    pub fn inverse(&self, zs: &[f64]) -> Vec<f64> {
        zs.iter().map(|&z| self.inverse_one(z)).collect()
    }
}

/// Standardize a series, returning the normalized values and the fitted
/// parameters needed to reverse the transform
pub fn normalize(values: &[f64]) -> (Vec<f64>, NormalizationParams) {
    let params = NormalizationParams::fit(values);
    (params.transform(values), params)
}
