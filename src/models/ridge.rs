//! Closed-form ridge regression

use crate::error::{ForecastError, Result};
use crate::models::Predictor;

/// Default L2 penalty, small enough to leave well-conditioned problems
/// essentially unregularized
pub const DEFAULT_LAMBDA: f64 = 0.01;

/// Multivariate ridge regression fitted by the normal equations.
///
/// Solves `(XᵀX + λI) w = Xᵀy` with an unpenalized intercept.
/// Deterministic: the same dataset always yields the same weights.
#[derive(Debug, Clone)]
pub struct RidgeRegression {
    /// Name of the model
    name: String,
    /// L2 penalty applied to every weight except the intercept
    lambda: f64,
    /// Intercept followed by one weight per feature column; empty until trained
    weights: Vec<f64>,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        // DEFAULT_LAMBDA is non-negative, so new cannot fail
        Self::new(DEFAULT_LAMBDA).unwrap_or(Self {
            name: "Ridge Regression".to_string(),
            lambda: DEFAULT_LAMBDA,
            weights: Vec::new(),
        })
    }
}

impl RidgeRegression {
    /// Create a new ridge regression model
    pub fn new(lambda: f64) -> Result<Self> {
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Lambda must be a non-negative finite number".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Ridge Regression (lambda={})", lambda),
            lambda,
            weights: Vec::new(),
        })
    }

    /// Whether the model has been trained
    pub fn is_trained(&self) -> bool {
        !self.weights.is_empty()
    }

    /// Fitted weights: intercept first, then one weight per feature column
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl Predictor for RidgeRegression {
    fn train(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        if features.is_empty() {
            return Err(ForecastError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        if features.len() != targets.len() {
            return Err(ForecastError::InvalidSeriesShape(format!(
                "feature rows ({}) don't match targets ({})",
                features.len(),
                targets.len()
            )));
        }

        let width = features[0].len();
        if width == 0 {
            return Err(ForecastError::InvalidParameter(
                "Feature rows must not be empty".to_string(),
            ));
        }
        if features.iter().any(|row| row.len() != width) {
            return Err(ForecastError::InvalidSeriesShape(
                "feature rows have inconsistent widths".to_string(),
            ));
        }

        // Augmented dimension: intercept column plus the feature columns
        let dim = width + 1;
        let mut gram = vec![vec![0.0; dim]; dim];
        let mut moment = vec![0.0; dim];

        for (row, &y) in features.iter().zip(targets.iter()) {
            let mut augmented = Vec::with_capacity(dim);
            augmented.push(1.0);
            augmented.extend_from_slice(row);

            for i in 0..dim {
                for j in 0..dim {
                    gram[i][j] += augmented[i] * augmented[j];
                }
                moment[i] += augmented[i] * y;
            }
        }

        // Penalize everything except the intercept
        for (i, gram_row) in gram.iter_mut().enumerate().skip(1) {
            gram_row[i] += self.lambda;
        }

        self.weights = solve_linear_system(gram, moment)?;
        Ok(())
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>> {
        if self.weights.is_empty() {
            return Err(ForecastError::PredictorFailure(
                "model has not been trained".to_string(),
            ));
        }

        let width = self.weights.len() - 1;
        let mut predictions = Vec::with_capacity(features.len());

        for row in features {
            if row.len() != width {
                return Err(ForecastError::PredictorFailure(format!(
                    "feature row width ({}) doesn't match trained width ({})",
                    row.len(),
                    width
                )));
            }

            let mut value = self.weights[0];
            for (weight, feature) in self.weights[1..].iter().zip(row.iter()) {
                value += weight * feature;
            }
            predictions.push(value);
        }

        Ok(predictions)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Solve `A x = b` by Gaussian elimination with partial pivoting
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        // Pick the largest remaining pivot for numerical stability
        let mut pivot = col;
        for row in col + 1..n {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }

        if a[pivot][col].abs() < 1e-12 {
            return Err(ForecastError::PredictorFailure(
                "singular design matrix".to_string(),
            ));
        }

        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for col in (0..n).rev() {
        let mut sum = b[col];
        for k in col + 1..n {
            sum -= a[col][k] * x[k];
        }
        x[col] = sum / a[col][col];
    }

    Ok(x)
}
